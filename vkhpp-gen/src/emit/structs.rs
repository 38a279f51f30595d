//! Structure and union emission.

use crate::model::{MemberData, Registry, StructureData};
use crate::names;
use crate::template::Template;

/// Emit one structure or union wrapper.
pub fn emit_struct(reg: &Registry, c_name: &str, data: &StructureData) -> String {
    if data.is_union {
        emit_union(reg, c_name, data)
    } else {
        emit_plain_struct(reg, c_name, data)
    }
}

fn emit_plain_struct(reg: &Registry, c_name: &str, data: &StructureData) -> String {
    let cpp_name = names::cpp_type_name(c_name);

    let mut out = String::new();
    out.push_str(&format!("  struct {cpp_name}\n  {{\n"));
    out.push_str(&format!("    using NativeType = {c_name};\n\n"));

    if let Some(stype) = data.stype_value() {
        if let Some(stype_cpp) = structure_type_cpp(reg, stype) {
            out.push_str(&format!(
                "    static const bool                               allowDuplicate = {};\n",
                data.allow_duplicate
            ));
            out.push_str(&format!(
                "    static VULKAN_HPP_CONST_OR_CONSTEXPR StructureType structureType = StructureType::{stype_cpp};\n\n"
            ));
        }
    }

    out.push_str(&emit_struct_constructor(reg, &cpp_name, data));
    if !data.returned_only {
        out.push_str(&emit_proxy_constructor(reg, &cpp_name, data));
        out.push_str(&emit_setters(reg, &cpp_name, data));
    }
    out.push_str(&emit_conversions(c_name, &cpp_name));
    out.push_str(&emit_comparisons(&cpp_name, data));
    out.push_str(&emit_member_declarations(reg, data));
    out.push_str("  };\n\n");

    out.push_str(&Template::new(
        "  VULKAN_HPP_STATIC_ASSERT( sizeof( VULKAN_HPP_NAMESPACE::${cpp} ) == sizeof( ${c} ), \"struct and wrapper have different size!\" );\n  VULKAN_HPP_STATIC_ASSERT( std::is_standard_layout<VULKAN_HPP_NAMESPACE::${cpp}>::value, \"struct wrapper is not a standard layout!\" );\n\n",
    )
    .with("cpp", cpp_name.as_str())
    .with("c", c_name)
    .render());

    if data.stype_value().is_some() && structure_type_cpp(reg, data.stype_value().unwrap()).is_some()
    {
        let stype_cpp = structure_type_cpp(reg, data.stype_value().unwrap()).unwrap();
        out.push_str(&Template::new(
            "  template <>\n  struct CppType<StructureType, StructureType::${stype}>\n  {\n    using Type = ${cpp};\n  };\n\n",
        )
        .with("stype", stype_cpp)
        .with("cpp", cpp_name.as_str())
        .render());
    }

    for alias in &data.aliases {
        out.push_str(&format!(
            "  using {} = {cpp_name};\n\n",
            names::cpp_type_name(alias)
        ));
    }

    out
}

/// The member-wise constructor: every member except `sType`, defaulted,
/// `pNext` moved to the end.
fn emit_struct_constructor(reg: &Registry, cpp_name: &str, data: &StructureData) -> String {
    let mut params: Vec<String> = Vec::new();
    let mut inits: Vec<String> = Vec::new();

    for member in ordered_ctor_members(data) {
        params.push(format!(
            "{} {}_ = {}",
            member_cpp_type(reg, member),
            member.name,
            member_default(member)
        ));
        inits.push(format!("{0}{{ {0}_ }}", member.name));
    }

    if params.is_empty() {
        return format!("    VULKAN_HPP_CONSTEXPR {cpp_name}() VULKAN_HPP_NOEXCEPT = default;\n\n");
    }

    let init_list = if inits.is_empty() {
        String::new()
    } else {
        format!("\n      : {}\n    ", inits.join("\n      , "))
    };

    Template::new(
        "    VULKAN_HPP_CONSTEXPR ${name}( ${params} ) VULKAN_HPP_NOEXCEPT${inits}{}\n\n    VULKAN_HPP_CONSTEXPR ${name}( ${name} const & rhs ) VULKAN_HPP_NOEXCEPT = default;\n\n    ${name}( Vk${name} const & rhs ) VULKAN_HPP_NOEXCEPT : ${name}( *reinterpret_cast<${name} const *>( &rhs ) ) {}\n\n",
    )
    .with("name", cpp_name)
    .with("params", params.join(", "))
    .with("inits", init_list)
    .render()
}

/// The enhanced constructor taking `ArrayProxyNoTemporaries` for every
/// (count, pointer) pair, computing counts from the proxies.
fn emit_proxy_constructor(reg: &Registry, cpp_name: &str, data: &StructureData) -> String {
    let vector_members: Vec<&MemberData> = data
        .members
        .iter()
        .filter(|m| sibling_count_member(data, m).is_some())
        .collect();
    if vector_members.is_empty() {
        return String::new();
    }

    let mut params: Vec<String> = Vec::new();
    let mut inits: Vec<String> = Vec::new();
    let mut counted: Vec<&str> = Vec::new();
    for m in &vector_members {
        counted.push(sibling_count_member(data, m).unwrap());
    }

    // Default arguments may only trail the last proxy parameter.
    let ordered = ordered_ctor_members(data);
    let exposed: Vec<&&MemberData> = ordered
        .iter()
        .filter(|m| !counted.contains(&m.name.as_str()))
        .collect();
    let last_proxy = exposed
        .iter()
        .rposition(|m| sibling_count_member(data, m).is_some())
        .unwrap_or(0);

    for (position, member) in exposed.iter().enumerate() {
        if let Some(count_name) = sibling_count_member(data, member) {
            let element = element_cpp_type(reg, member);
            params.push(format!(
                "VULKAN_HPP_NAMESPACE::ArrayProxyNoTemporaries<{element}> const & {}_",
                member.name
            ));
            inits.push(format!(
                "{count_name}{{ static_cast<uint32_t>( {}_.size() ) }}",
                member.name
            ));
            inits.push(format!("{0}{{ {0}_.data() }}", member.name));
        } else {
            let default = if position > last_proxy {
                format!(" = {}", member_default(member))
            } else {
                String::new()
            };
            params.push(format!(
                "{} {}_{default}",
                member_cpp_type(reg, member),
                member.name
            ));
            inits.push(format!("{0}{{ {0}_ }}", member.name));
        }
    }

    Template::new(
        "#  if !defined( VULKAN_HPP_DISABLE_ENHANCED_MODE )\n    ${name}( ${params} )\n      : ${inits}\n    {}\n#  endif /* VULKAN_HPP_DISABLE_ENHANCED_MODE */\n\n",
    )
    .with("name", cpp_name)
    .with("params", params.join(", "))
    .with("inits", inits.join("\n      , "))
    .render()
}

fn emit_setters(reg: &Registry, cpp_name: &str, data: &StructureData) -> String {
    let mut out = String::new();
    for member in &data.members {
        if member.name == "sType" {
            continue;
        }
        let setter = format!("set{}", names::start_upper_case(&member.name));
        out.push_str(
            &Template::new(
                "    VULKAN_HPP_CONSTEXPR_14 ${struct} & ${setter}( ${type} ${member}_ ) VULKAN_HPP_NOEXCEPT\n    {\n      ${member} = ${member}_;\n      return *this;\n    }\n\n",
            )
            .with("struct", cpp_name)
            .with("setter", setter)
            .with("type", member_cpp_type(reg, member))
            .with("member", member.name.as_str())
            .render(),
        );
    }
    out
}

fn emit_conversions(c_name: &str, _cpp_name: &str) -> String {
    Template::new(
        "    operator ${c} const &() const VULKAN_HPP_NOEXCEPT\n    {\n      return *reinterpret_cast<const ${c} *>( this );\n    }\n\n    operator ${c} &() VULKAN_HPP_NOEXCEPT\n    {\n      return *reinterpret_cast<${c} *>( this );\n    }\n\n",
    )
    .with("c", c_name)
    .render()
}

fn emit_comparisons(cpp_name: &str, data: &StructureData) -> String {
    let mut terms: Vec<String> = Vec::new();
    for member in &data.members {
        if member.array_sizes.is_empty() {
            terms.push(format!("( {0} == rhs.{0} )", member.name));
        } else {
            // Opaque blobs and fixed arrays compare by bytes.
            terms.push(format!(
                "( memcmp( &{0}, &rhs.{0}, sizeof( {0} ) ) == 0 )",
                member.name
            ));
        }
    }
    let body = if terms.is_empty() {
        "true".to_string()
    } else {
        terms.join("\n          && ")
    };

    Template::new(
        "#if defined( VULKAN_HPP_HAS_SPACESHIP_OPERATOR )\n    auto operator<=>( ${name} const & ) const = default;\n#else\n    bool operator==( ${name} const & rhs ) const VULKAN_HPP_NOEXCEPT\n    {\n      return ${body};\n    }\n\n    bool operator!=( ${name} const & rhs ) const VULKAN_HPP_NOEXCEPT\n    {\n      return !operator==( rhs );\n    }\n#endif\n\n",
    )
    .with("name", cpp_name)
    .with("body", body)
    .render()
}

fn emit_member_declarations(reg: &Registry, data: &StructureData) -> String {
    let mut out = String::new();
    for member in &data.members {
        let default = if data.returned_only {
            String::new()
        } else {
            format!(" = {}", member_decl_default(reg, member))
        };
        if let Some(bits) = &member.bit_count {
            out.push_str(&format!(
                "    {} {} : {bits};\n",
                member_cpp_type(reg, member),
                member.name
            ));
        } else {
            out.push_str(&format!(
                "    {} {}{default};\n",
                member_cpp_type(reg, member),
                member.name
            ));
        }
    }
    out
}

fn emit_union(reg: &Registry, c_name: &str, data: &StructureData) -> String {
    let cpp_name = names::cpp_type_name(c_name);
    let mut out = String::new();
    out.push_str(&format!("  union {cpp_name}\n  {{\n"));
    out.push_str(&format!("    using NativeType = {c_name};\n\n"));

    // One constructor per member; the first doubles as the default.
    for (index, member) in data.members.iter().enumerate() {
        let default = if index == 0 {
            format!(" = {}", member_default(member))
        } else {
            String::new()
        };
        out.push_str(
            &Template::new(
                "    VULKAN_HPP_CONSTEXPR_14 ${union}( ${type} ${member}_${default} ) : ${member}( ${member}_ ) {}\n\n",
            )
            .with("union", cpp_name.as_str())
            .with("type", member_cpp_type(reg, member))
            .with("member", member.name.as_str())
            .with("default", default)
            .render(),
        );
    }

    for member in &data.members {
        let setter = format!("set{}", names::start_upper_case(&member.name));
        out.push_str(
            &Template::new(
                "    VULKAN_HPP_CONSTEXPR_14 ${union} & ${setter}( ${type} ${member}_ ) VULKAN_HPP_NOEXCEPT\n    {\n      ${member} = ${member}_;\n      return *this;\n    }\n\n",
            )
            .with("union", cpp_name.as_str())
            .with("setter", setter)
            .with("type", member_cpp_type(reg, member))
            .with("member", member.name.as_str())
            .render(),
        );
    }

    out.push_str(&emit_conversions(c_name, &cpp_name));

    for member in &data.members {
        out.push_str(&format!(
            "    {} {};\n",
            member_c_storage_type(member),
            member.name
        ));
    }
    out.push_str("  };\n\n");
    out
}

// ---------------------------------------------------------------------------
// Member type helpers
// ---------------------------------------------------------------------------

/// Members in constructor order: `sType` dropped, `pNext` moved last.
fn ordered_ctor_members(data: &StructureData) -> Vec<&MemberData> {
    let mut members: Vec<&MemberData> = data
        .members
        .iter()
        .filter(|m| m.name != "sType" && m.name != "pNext")
        .collect();
    if let Some(pnext) = data.members.iter().find(|m| m.name == "pNext") {
        members.push(pnext);
    }
    members
}

/// The C++ spelling of a member type; fixed arrays wrap in `ArrayWrapper`.
pub fn member_cpp_type(reg: &Registry, member: &MemberData) -> String {
    let base = scalar_cpp_type(reg, &member.type_info.ty);
    let composed = compose_with(&member.type_info.prefix, &base, &member.type_info.postfix);
    match member.array_sizes.len() {
        0 => composed,
        1 => format!(
            "VULKAN_HPP_NAMESPACE::ArrayWrapper1D<{composed}, {}>",
            member.array_sizes[0]
        ),
        _ => format!(
            "VULKAN_HPP_NAMESPACE::ArrayWrapper2D<{composed}, {}, {}>",
            member.array_sizes[0], member.array_sizes[1]
        ),
    }
}

/// Union storage keeps plain C arrays so the union stays trivially copyable.
fn member_c_storage_type(member: &MemberData) -> String {
    let mut decl = member.type_info.compose_cpp();
    for size in &member.array_sizes {
        decl.push_str(&format!("[{size}]"));
    }
    decl
}

/// The element type a proxy constructor passes for a pointer member:
/// `const VkDescriptorSetLayout * pSetLayouts` → `const DescriptorSetLayout`,
/// `const char * const * ppEnabledExtensionNames` → `const char * const`.
fn element_cpp_type(reg: &Registry, member: &MemberData) -> String {
    let base = scalar_cpp_type(reg, &member.type_info.ty);
    let constness = if member.type_info.prefix.contains("const") {
        "const "
    } else {
        ""
    };
    if member.type_info.pointer_depth() > 1 {
        format!("{constness}{base} * const")
    } else {
        format!("{constness}{base}")
    }
}

/// Map a C type name to its C++ spelling; types outside the registry keep
/// their C name.
fn scalar_cpp_type(reg: &Registry, c_ty: &str) -> String {
    if reg.types.contains_key(c_ty) && c_ty.starts_with("Vk") {
        format!("VULKAN_HPP_NAMESPACE::{}", names::cpp_type_name(c_ty))
    } else {
        c_ty.to_string()
    }
}

fn compose_with(prefix: &str, ty: &str, postfix: &str) -> String {
    let mut out = String::new();
    if !prefix.is_empty() {
        out.push_str(prefix);
        out.push(' ');
    }
    out.push_str(ty);
    if !postfix.is_empty() {
        out.push(' ');
        out.push_str(postfix);
    }
    out
}

/// Default initializer for a member: the declared `sType` value, `nullptr`
/// for `pNext`, `{}` otherwise.
fn member_default(member: &MemberData) -> String {
    if member.name == "pNext" {
        return "nullptr".to_string();
    }
    "{}".to_string()
}

/// Default for a member declaration in place, which unlike the constructor
/// default knows the struct's declared `sType` value.
fn member_decl_default(reg: &Registry, member: &MemberData) -> String {
    if member.name == "sType" {
        if let Some(value) = member.values.first() {
            if let Some(cpp) = structure_type_cpp(reg, value) {
                return format!("StructureType::{cpp}");
            }
        }
    }
    member_default(member)
}

/// Count member a vector member is sized by, when the `len` names a sibling.
fn sibling_count_member<'a>(data: &'a StructureData, member: &MemberData) -> Option<&'a str> {
    let len = member.len.first()?;
    if len == "null-terminated" || len.starts_with("latexmath") {
        return None;
    }
    data.members
        .iter()
        .find(|m| m.name == *len)
        .map(|m| m.name.as_str())
}

/// The `StructureType` cpp value for an sType c-name.
fn structure_type_cpp(reg: &Registry, stype_c_name: &str) -> Option<String> {
    reg.enums
        .get("VkStructureType")?
        .resolve_alias(stype_c_name)
        .map(|v| v.cpp_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_registry;

    fn registry() -> Registry {
        parse_registry(
            r#"
<registry>
    <types>
        <type name="uint32_t"/>
        <type name="void"/>
        <type name="float"/>
        <type name="int32_t"/>
        <type category="enum" name="VkStructureType"/>
        <type category="struct" name="VkBufferCreateInfo">
            <member values="VK_STRUCTURE_TYPE_BUFFER_CREATE_INFO"><type>VkStructureType</type> <name>sType</name></member>
            <member optional="true">const <type>void</type>* <name>pNext</name></member>
            <member optional="true"><type>uint32_t</type> <name>queueFamilyIndexCount</name></member>
            <member len="queueFamilyIndexCount">const <type>uint32_t</type>* <name>pQueueFamilyIndices</name></member>
        </type>
        <type category="struct" name="VkExtensionProperties" returnedonly="true">
            <member><type>uint32_t</type> <name>specVersion</name></member>
        </type>
        <type category="union" name="VkClearColorValue">
            <member><type>float</type> <name>float32</name>[4]</member>
            <member><type>int32_t</type> <name>int32</name>[4]</member>
            <member><type>uint32_t</type> <name>uint32</name>[4]</member>
        </type>
    </types>
    <enums name="VkStructureType" type="enum">
        <enum value="12" name="VK_STRUCTURE_TYPE_BUFFER_CREATE_INFO"/>
    </enums>
    <commands/>
</registry>"#,
        )
        .unwrap()
    }

    #[test]
    fn struct_carries_structure_type_constant() {
        let reg = registry();
        let text = emit_struct(&reg, "VkBufferCreateInfo", &reg.structs["VkBufferCreateInfo"]);
        assert!(text.contains("struct BufferCreateInfo"));
        assert!(text.contains("structureType = StructureType::eBufferCreateInfo"));
        assert!(text.contains(
            "CppType<StructureType, StructureType::eBufferCreateInfo>"
        ));
    }

    #[test]
    fn struct_has_setters_returning_self() {
        let reg = registry();
        let text = emit_struct(&reg, "VkBufferCreateInfo", &reg.structs["VkBufferCreateInfo"]);
        assert!(text.contains("BufferCreateInfo & setQueueFamilyIndexCount"));
        assert!(text.contains("BufferCreateInfo & setPNext"));
        assert!(!text.contains("setSType"));
        assert!(text.contains("return *this;"));
    }

    #[test]
    fn proxy_constructor_computes_count() {
        let reg = registry();
        let text = emit_struct(&reg, "VkBufferCreateInfo", &reg.structs["VkBufferCreateInfo"]);
        assert!(text.contains("ArrayProxyNoTemporaries<const uint32_t> const & pQueueFamilyIndices_"));
        assert!(text.contains(
            "queueFamilyIndexCount{ static_cast<uint32_t>( pQueueFamilyIndices_.size() ) }"
        ));
    }

    #[test]
    fn returned_only_struct_has_no_setters() {
        let reg = registry();
        let text = emit_struct(
            &reg,
            "VkExtensionProperties",
            &reg.structs["VkExtensionProperties"],
        );
        assert!(!text.contains("setSpecVersion"));
        assert!(text.contains("operator VkExtensionProperties const &()"));
    }

    #[test]
    fn union_members_share_storage_without_equality() {
        let reg = registry();
        let text = emit_struct(&reg, "VkClearColorValue", &reg.structs["VkClearColorValue"]);
        assert!(text.contains("union ClearColorValue"));
        assert!(text.contains("float float32[4];"));
        assert!(text.contains("setInt32"));
        assert!(!text.contains("operator=="));
    }

    #[test]
    fn conversion_operators_both_ways() {
        let reg = registry();
        let text = emit_struct(&reg, "VkBufferCreateInfo", &reg.structs["VkBufferCreateInfo"]);
        assert!(text.contains("operator VkBufferCreateInfo const &() const VULKAN_HPP_NOEXCEPT"));
        assert!(text.contains("operator VkBufferCreateInfo &() VULKAN_HPP_NOEXCEPT"));
    }
}
