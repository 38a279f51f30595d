//! Handle class emission.
//!
//! Each handle wraps its C counterpart in a value class carrying the member
//! commands the overload selector picked. Free functions (the empty-name
//! handle) are emitted at namespace scope.

use indexmap::IndexMap;

use crate::classify::Classification;
use crate::emit::commands::{emit_declaration, CommandContext};
use crate::model::{HandleData, Registry};
use crate::names;
use crate::select::Selection;
use crate::template::Template;

/// Per-command analysis shared between the handle section and the
/// command-definition section.
pub type CommandAnalysis = IndexMap<String, (Classification, Selection)>;

/// Emit one handle class (or the free-function declarations for the
/// empty-name handle).
pub fn emit_handle(
    reg: &Registry,
    c_name: &str,
    data: &HandleData,
    analysis: &CommandAnalysis,
) -> String {
    if c_name.is_empty() {
        return emit_free_function_declarations(reg, data, analysis);
    }
    if let Some(alias) = &data.alias {
        return format!(
            "  using {} = {};\n\n",
            names::cpp_type_name(c_name),
            names::cpp_type_name(alias)
        );
    }

    let cpp_name = names::cpp_type_name(c_name);
    let member = format!("m_{}", names::start_lower_case(&cpp_name));
    let object_type = object_type_value(reg, data).unwrap_or_else(|| "eUnknown".to_string());

    let mut methods = String::new();
    for command in &data.commands {
        methods.push_str(&emit_command_declarations(reg, command, c_name, analysis));
    }

    let mut out = Template::new(
        r#"  class ${name}
  {
  public:
    using CType      = ${c};
    using NativeType = ${c};

    static VULKAN_HPP_CONST_OR_CONSTEXPR ObjectType objectType = ObjectType::${objtype};

  public:
    VULKAN_HPP_CONSTEXPR ${name}() = default;

    VULKAN_HPP_CONSTEXPR ${name}( std::nullptr_t ) VULKAN_HPP_NOEXCEPT {}

    VULKAN_HPP_TYPESAFE_EXPLICIT ${name}( ${c} ${arg} ) VULKAN_HPP_NOEXCEPT : ${member}( ${arg} ) {}

#if defined( VULKAN_HPP_TYPESAFE_CONVERSION )
    ${name} & operator=( ${c} ${arg} ) VULKAN_HPP_NOEXCEPT
    {
      ${member} = ${arg};
      return *this;
    }
#endif

    ${name} & operator=( std::nullptr_t ) VULKAN_HPP_NOEXCEPT
    {
      ${member} = {};
      return *this;
    }

#if defined( VULKAN_HPP_HAS_SPACESHIP_OPERATOR )
    auto operator<=>( ${name} const & ) const = default;
#else
    bool operator==( ${name} const & rhs ) const VULKAN_HPP_NOEXCEPT
    {
      return ${member} == rhs.${member};
    }

    bool operator!=( ${name} const & rhs ) const VULKAN_HPP_NOEXCEPT
    {
      return ${member} != rhs.${member};
    }

    bool operator<( ${name} const & rhs ) const VULKAN_HPP_NOEXCEPT
    {
      return ${member} < rhs.${member};
    }
#endif

${methods}    operator ${c}() const VULKAN_HPP_NOEXCEPT
    {
      return ${member};
    }

    explicit operator bool() const VULKAN_HPP_NOEXCEPT
    {
      return ${member} != VK_NULL_HANDLE;
    }

    bool operator!() const VULKAN_HPP_NOEXCEPT
    {
      return ${member} == VK_NULL_HANDLE;
    }

  private:
    ${c} ${member} = {};
  };

  VULKAN_HPP_STATIC_ASSERT( sizeof( VULKAN_HPP_NAMESPACE::${name} ) == sizeof( ${c} ),
                            "handle and wrapper have different size!" );

  template <>
  struct CppType<VULKAN_HPP_NAMESPACE::ObjectType, VULKAN_HPP_NAMESPACE::ObjectType::${objtype}>
  {
    using Type = VULKAN_HPP_NAMESPACE::${name};
  };

"#,
    )
    .with("name", cpp_name.as_str())
    .with("c", c_name)
    .with("arg", names::start_lower_case(&cpp_name))
    .with("member", member)
    .with("objtype", object_type)
    .with("methods", methods)
    .render();

    out.push_str(&emit_unique_alias(reg, c_name, data));
    out
}

/// `UniqueHandleTraits` + the `UniqueX` alias for deletable handles.
fn emit_unique_alias(reg: &Registry, c_name: &str, data: &HandleData) -> String {
    if data.delete_command.is_empty() {
        return String::new();
    }
    let cpp_name = names::cpp_type_name(c_name);
    let deleter = deleter_type(reg, c_name, data);

    Template::new(
        r#"#ifndef VULKAN_HPP_NO_SMART_HANDLE
  template <typename Dispatch>
  class UniqueHandleTraits<${name}, Dispatch>
  {
  public:
    using deleter = ${deleter};
  };
  using Unique${name} = UniqueHandle<${name}, VULKAN_HPP_DEFAULT_DISPATCHER_TYPE>;
#endif /* VULKAN_HPP_NO_SMART_HANDLE */

"#,
    )
    .with("name", cpp_name)
    .with("deleter", deleter)
    .render()
}

/// The deleter a `UniqueHandle` of this handle uses, derived from the
/// registered delete command. A handle destroyed through itself
/// (`vkDestroyInstance`) has no owner.
fn deleter_type(reg: &Registry, c_name: &str, data: &HandleData) -> String {
    let delete_cmd = reg.commands.get(&data.delete_command);
    let owner = delete_cmd
        .map(|c| c.handle.clone())
        .filter(|h| !h.is_empty() && h != c_name)
        .map(|h| names::cpp_type_name(&h))
        .unwrap_or_else(|| "NoParent".to_string());

    if !data.delete_pool.is_empty() {
        let pool_type = delete_cmd
            .and_then(|c| c.params.iter().find(|p| p.name == data.delete_pool))
            .map(|p| names::cpp_type_name(&p.type_info.ty))
            .unwrap_or_else(|| "NoParent".to_string());
        return format!("PoolFree<{owner}, {pool_type}, Dispatch>");
    }
    if data.delete_command.starts_with("vkFree") {
        format!("ObjectFree<{owner}, Dispatch>")
    } else if data.delete_command.starts_with("vkRelease") {
        format!("ObjectRelease<{owner}, Dispatch>")
    } else {
        format!("ObjectDestroy<{owner}, Dispatch>")
    }
}

/// All declarations one command contributes to a class body: every selected
/// overload, under the primary name, any shortened destroy-family name, and
/// every alias name.
fn emit_command_declarations(
    reg: &Registry,
    command: &str,
    handle: &str,
    analysis: &CommandAnalysis,
) -> String {
    let Some((cls, selection)) = analysis.get(command) else {
        return String::new();
    };
    let cmd = &reg.commands[command];
    let mut out = String::new();

    let mut names_to_emit: Vec<(String, String)> =
        vec![(command.to_string(), names::cpp_command_name(command))];
    if let Some(short) = shortened_destroy_name(command) {
        names_to_emit.push((command.to_string(), short));
    }
    for alias in cmd.aliases.keys() {
        names_to_emit.push((alias.clone(), names::cpp_command_name(alias)));
    }

    for (c_name, method_base) in names_to_emit {
        let ctx = CommandContext {
            reg,
            c_name: &c_name,
            cmd,
            cls,
            handle,
        };
        for overload in &selection.overloads {
            let method_name = if overload.unique {
                format!("{method_base}Unique")
            } else if overload.kind == crate::select::OverloadKind::Singular {
                names::strip_plural_s(&method_base)
            } else {
                method_base.clone()
            };
            out.push_str(&emit_declaration(&ctx, overload, &method_name));
        }
    }

    wrap_protect(reg, cmd, out)
}

/// Free functions live on the empty-name handle and are declared at
/// namespace scope.
fn emit_free_function_declarations(
    reg: &Registry,
    data: &HandleData,
    analysis: &CommandAnalysis,
) -> String {
    let mut out = String::new();
    for command in &data.commands {
        let decls = emit_command_declarations(reg, command, "", analysis);
        // Namespace scope sits two levels shallower than a class body.
        out.push_str(&decls.replace("\n    ", "\n  "));
    }
    out
}

/// `vkDestroyBuffer` → `destroy`, `vkFreeMemory` → `free`,
/// `vkReleaseProfilingLock` → `release`.
fn shortened_destroy_name(command: &str) -> Option<String> {
    for (prefix, short) in [
        ("vkDestroy", "destroy"),
        ("vkFree", "free"),
        ("vkRelease", "release"),
    ] {
        if command.starts_with(prefix) && command.len() > prefix.len() {
            return Some(short.to_string());
        }
    }
    None
}

fn wrap_protect(reg: &Registry, cmd: &crate::model::CommandData, text: String) -> String {
    match reg.protect_for_command(cmd) {
        Some(protect) if !text.is_empty() => format!(
            "#if defined( {protect} )\n{text}#endif /* {protect} */\n\n"
        ),
        _ => text,
    }
}

fn object_type_value(reg: &Registry, data: &HandleData) -> Option<String> {
    reg.enums
        .get("VkObjectType")?
        .resolve_alias(&data.obj_type_enum)
        .map(|v| v.cpp_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::extract::parse_registry;
    use crate::select::select;

    fn registry() -> Registry {
        parse_registry(
            r#"
<registry>
    <types>
        <type name="uint32_t"/>
        <type name="void"/>
        <type category="enum" name="VkResult"/>
        <type category="enum" name="VkObjectType"/>
        <type category="enum" name="VkStructureType"/>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_DEVICE"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
        <type category="handle" parent="VkDevice" objtypeenum="VK_OBJECT_TYPE_BUFFER"><type>VK_DEFINE_NON_DISPATCHABLE_HANDLE</type>(<name>VkBuffer</name>)</type>
        <type category="struct" name="VkAllocationCallbacks">
            <member><type>void</type>* <name>pUserData</name></member>
        </type>
        <type category="struct" name="VkBufferCreateInfo">
            <member values="VK_STRUCTURE_TYPE_BUFFER_CREATE_INFO"><type>VkStructureType</type> <name>sType</name></member>
            <member><type>uint32_t</type> <name>size</name></member>
        </type>
    </types>
    <enums name="VkResult" type="enum">
        <enum value="0" name="VK_SUCCESS"/>
    </enums>
    <enums name="VkObjectType" type="enum">
        <enum value="0" name="VK_OBJECT_TYPE_UNKNOWN"/>
        <enum value="1" name="VK_OBJECT_TYPE_DEVICE"/>
        <enum value="2" name="VK_OBJECT_TYPE_BUFFER"/>
    </enums>
    <enums name="VkStructureType" type="enum">
        <enum value="12" name="VK_STRUCTURE_TYPE_BUFFER_CREATE_INFO"/>
    </enums>
    <commands>
        <command successcodes="VK_SUCCESS">
            <proto><type>VkResult</type> <name>vkCreateBuffer</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
            <param>const <type>VkBufferCreateInfo</type>* <name>pCreateInfo</name></param>
            <param optional="true">const <type>VkAllocationCallbacks</type>* <name>pAllocator</name></param>
            <param><type>VkBuffer</type>* <name>pBuffer</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkDestroyBuffer</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
            <param optional="true"><type>VkBuffer</type> <name>buffer</name></param>
            <param optional="true">const <type>VkAllocationCallbacks</type>* <name>pAllocator</name></param>
        </command>
    </commands>
</registry>"#,
        )
        .unwrap()
    }

    fn analysis(reg: &Registry) -> CommandAnalysis {
        let mut out = CommandAnalysis::default();
        for (name, cmd) in &reg.commands {
            let cls = classify(cmd, reg);
            if let Some(sel) = select(name, cmd, &cls, reg) {
                out.insert(name.clone(), (cls, sel));
            }
        }
        out
    }

    #[test]
    fn buffer_class_carries_object_type_and_size_assert() {
        let reg = registry();
        let a = analysis(&reg);
        let text = emit_handle(&reg, "VkBuffer", &reg.handles["VkBuffer"], &a);
        assert!(text.contains("class Buffer"));
        assert!(text.contains("objectType = ObjectType::eBuffer"));
        assert!(text.contains(
            "sizeof( VULKAN_HPP_NAMESPACE::Buffer ) == sizeof( VkBuffer )"
        ));
        assert!(text.contains("CppType<VULKAN_HPP_NAMESPACE::ObjectType, VULKAN_HPP_NAMESPACE::ObjectType::eBuffer>"));
    }

    #[test]
    fn device_has_create_buffer_family() {
        let reg = registry();
        let a = analysis(&reg);
        let text = emit_handle(&reg, "VkDevice", &reg.handles["VkDevice"], &a);
        assert!(text.contains("createBuffer("));
        assert!(text.contains("createBufferUnique("));
        assert!(text.contains("destroyBuffer("));
        // The shortened destroy-family name.
        assert!(text.contains(" destroy("));
    }

    #[test]
    fn deletable_handle_gets_unique_alias() {
        let reg = registry();
        let a = analysis(&reg);
        let text = emit_handle(&reg, "VkBuffer", &reg.handles["VkBuffer"], &a);
        assert!(text.contains("using UniqueBuffer = UniqueHandle<Buffer, VULKAN_HPP_DEFAULT_DISPATCHER_TYPE>;"));
        assert!(text.contains("using deleter = ObjectDestroy<Device, Dispatch>;"));
    }

    #[test]
    fn device_itself_has_no_unique_alias() {
        let reg = registry();
        let a = analysis(&reg);
        let text = emit_handle(&reg, "VkDevice", &reg.handles["VkDevice"], &a);
        assert!(!text.contains("using UniqueDevice"));
    }
}
