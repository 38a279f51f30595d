//! Enum and bitmask emission.

use crate::model::{BitmaskData, EnumData, Registry};
use crate::names;
use crate::template::Template;

/// `enum class Name : underlying { … };` — primary values first, aliases
/// after, in declaration order.
pub fn emit_enum(reg: &Registry, c_name: &str, data: &EnumData) -> String {
    let cpp_name = names::cpp_type_name(c_name);
    let underlying = if data.is_bitmask {
        format!(" : {}", bit_enum_underlying(reg, c_name))
    } else {
        String::new()
    };

    let mut values = String::new();
    for value in &data.values {
        values.push_str(&format!("    {} = {},\n", value.cpp_name, value.c_name));
    }
    for (alias_c_name, (_, alias_cpp)) in &data.aliases {
        values.push_str(&format!("    {alias_cpp} = {alias_c_name},\n"));
    }
    // Drop the trailing comma for a stable ending.
    let values = values.trim_end_matches('\n').trim_end_matches(',').to_string();

    Template::new(
        "  enum class ${name}${underlying}\n  {\n${values}\n  };\n\n",
    )
    .with("name", cpp_name)
    .with("underlying", underlying)
    .with("values", values)
    .render()
}

/// The `to_string` free function: one case per primary value, hex fallback.
pub fn emit_enum_to_string(c_name: &str, data: &EnumData) -> String {
    let cpp_name = names::cpp_type_name(c_name);
    if data.values.is_empty() {
        return Template::new(
            "  VULKAN_HPP_INLINE std::string to_string( ${name} )\n  {\n    return \"(void)\";\n  }\n\n",
        )
        .with("name", cpp_name)
        .render();
    }

    let mut cases = String::new();
    for value in &data.values {
        cases.push_str(&format!(
            "      case {cpp_name}::{value}: return \"{plain}\";\n",
            value = value.cpp_name,
            plain = &value.cpp_name[1..]
        ));
    }

    Template::new(
        r#"  VULKAN_HPP_INLINE std::string to_string( ${name} value )
  {
    switch ( value )
    {
${cases}      default: return "invalid ( " + toHexString( static_cast<uint32_t>( value ) ) + " )";
    }
  }

"#,
    )
    .with("name", cpp_name)
    .with("cases", cases)
    .render()
}

/// The `using Flags<Bits>` typedef, `FlagTraits` specialization, and the
/// bitwise operators of one bitmask.
pub fn emit_bitmask(reg: &Registry, c_name: &str, data: &BitmaskData) -> String {
    let cpp_name = names::cpp_type_name(c_name);
    if let Some(alias) = &data.alias {
        return format!("  using {} = {};\n\n", cpp_name, names::cpp_type_name(alias));
    }

    let bits_c_name = bit_enum_name(c_name, data);
    let bits_cpp = names::cpp_type_name(&bits_c_name);

    let mut out = String::new();

    // A bitmask without a declared bit enum still needs a placeholder so
    // `Flags<>` has something to instantiate over.
    let bits = reg.enums.get(&bits_c_name);
    if bits.is_none() {
        out.push_str(&format!(
            "  enum class {bits_cpp} : {underlying}\n  {{\n  }};\n\n",
            underlying = data.ty
        ));
        out.push_str(&format!(
            "  VULKAN_HPP_INLINE std::string to_string( {bits_cpp} )\n  {{\n    return \"(void)\";\n  }}\n\n"
        ));
    }

    out.push_str(&format!("  using {cpp_name} = Flags<{bits_cpp}>;\n\n"));

    let all_flags = match bits {
        Some(e) if !e.values.is_empty() => e
            .values
            .iter()
            .map(|v| format!("{bits_cpp}::{}", v.cpp_name))
            .collect::<Vec<_>>()
            .join(" | "),
        _ => String::from("{}"),
    };
    let all_flags = if all_flags == "{}" {
        "{}".to_string()
    } else {
        format!("\n      {all_flags}")
    };

    out.push_str(
        &Template::new(
            r#"  template <>
  struct FlagTraits<${bits}>
  {
    static VULKAN_HPP_CONST_OR_CONSTEXPR bool             isBitmask = true;
    static VULKAN_HPP_CONST_OR_CONSTEXPR ${flags} allFlags  = ${all};
  };

"#,
        )
        .with("bits", bits_cpp.as_str())
        .with("flags", cpp_name.as_str())
        .with("all", all_flags)
        .render(),
    );

    out
}

/// The four bitwise operators over the bit enum, each returning the flag
/// set type.
pub fn emit_bitmask_operators(c_name: &str, data: &BitmaskData) -> String {
    if data.alias.is_some() {
        return String::new();
    }
    let cpp_name = names::cpp_type_name(c_name);
    let bits_cpp = names::cpp_type_name(&bit_enum_name(c_name, data));

    Template::new(
        r#"  VULKAN_HPP_INLINE VULKAN_HPP_CONSTEXPR ${flags} operator|( ${bits} bit0, ${bits} bit1 ) VULKAN_HPP_NOEXCEPT
  {
    return ${flags}( bit0 ) | bit1;
  }

  VULKAN_HPP_INLINE VULKAN_HPP_CONSTEXPR ${flags} operator&( ${bits} bit0, ${bits} bit1 ) VULKAN_HPP_NOEXCEPT
  {
    return ${flags}( bit0 ) & bit1;
  }

  VULKAN_HPP_INLINE VULKAN_HPP_CONSTEXPR ${flags} operator^( ${bits} bit0, ${bits} bit1 ) VULKAN_HPP_NOEXCEPT
  {
    return ${flags}( bit0 ) ^ bit1;
  }

  VULKAN_HPP_INLINE VULKAN_HPP_CONSTEXPR ${flags} operator~( ${bits} bits ) VULKAN_HPP_NOEXCEPT
  {
    return ~( ${flags}( bits ) );
  }

"#,
    )
    .with("flags", cpp_name)
    .with("bits", bits_cpp)
    .render()
}

/// `to_string` for a flag set: the set bit names joined by `" | "`.
pub fn emit_bitmask_to_string(reg: &Registry, c_name: &str, data: &BitmaskData) -> String {
    if data.alias.is_some() {
        return String::new();
    }
    let cpp_name = names::cpp_type_name(c_name);
    let bits_c_name = bit_enum_name(c_name, data);
    let bits_cpp = names::cpp_type_name(&bits_c_name);

    let Some(bits) = reg.enums.get(&bits_c_name).filter(|e| !e.values.is_empty()) else {
        return Template::new(
            "  VULKAN_HPP_INLINE std::string to_string( ${name} )\n  {\n    return \"{}\";\n  }\n\n",
        )
        .with("name", cpp_name)
        .render();
    };

    let mut checks = String::new();
    for value in bits.values.iter().filter(|v| v.single_bit) {
        checks.push_str(&format!(
            "    if ( value & {bits_cpp}::{name} )\n      result += \"{plain} | \";\n",
            name = value.cpp_name,
            plain = &value.cpp_name[1..]
        ));
    }

    Template::new(
        r#"  VULKAN_HPP_INLINE std::string to_string( ${name} value )
  {
    if ( !value )
      return "{}";

    std::string result;
${checks}
    return "{ " + result.substr( 0, result.size() - 3 ) + " }";
  }

"#,
    )
    .with("name", cpp_name)
    .with("checks", checks)
    .render()
}

/// Resolve the bit enum backing a bitmask: the declared `requires`, or the
/// conventional `FlagBits` spelling when none is declared.
fn bit_enum_name(c_name: &str, data: &BitmaskData) -> String {
    if !data.requirements.is_empty() {
        data.requirements.clone()
    } else {
        c_name.replace("Flags", "FlagBits")
    }
}

/// The underlying C type of a bit enum, via the bitmask that requires it.
/// Bit enums without a requiring bitmask fall back to the conventional
/// `FlagBits`/`Flags` name correspondence, then to plain `VkFlags`.
fn bit_enum_underlying(reg: &Registry, bits_c_name: &str) -> String {
    reg.bitmasks
        .iter()
        .find(|(name, b)| bit_enum_name(name, b) == bits_c_name)
        .map(|(_, b)| b.ty.clone())
        .unwrap_or_else(|| "VkFlags".to_string())
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
        <type category="enum" name="VkImageType"/>
        <type category="enum" name="VkBufferCreateFlagBits"/>
        <type category="bitmask">typedef <type>VkFlags</type> <name>VkBufferCreateFlags</name>;</type>
        <type category="bitmask">typedef <type>VkFlags</type> <name>VkEmptyFlags</name>;</type>
    </types>
    <enums name="VkImageType" type="enum">
        <enum value="0" name="VK_IMAGE_TYPE_1D"/>
        <enum value="1" name="VK_IMAGE_TYPE_2D"/>
    </enums>
    <enums name="VkBufferCreateFlagBits" type="bitmask">
        <enum bitpos="0" name="VK_BUFFER_CREATE_SPARSE_BINDING_BIT"/>
        <enum bitpos="1" name="VK_BUFFER_CREATE_SPARSE_RESIDENCY_BIT"/>
    </enums>
    <commands/>
</registry>"#,
        )
        .unwrap()
    }

    #[test]
    fn enum_body_lists_values_in_order() {
        let reg = registry();
        let text = emit_enum(&reg, "VkImageType", &reg.enums["VkImageType"]);
        assert!(text.contains("enum class ImageType"));
        assert!(text.contains("e1D = VK_IMAGE_TYPE_1D"));
        assert!(text.contains("e2D = VK_IMAGE_TYPE_2D"));
        let pos_1d = text.find("e1D").unwrap();
        let pos_2d = text.find("e2D").unwrap();
        assert!(pos_1d < pos_2d);
    }

    #[test]
    fn to_string_has_hex_fallback() {
        let reg = registry();
        let text = emit_enum_to_string("VkImageType", &reg.enums["VkImageType"]);
        assert!(text.contains("case ImageType::e1D: return \"1D\";"));
        assert!(text.contains("toHexString"));
    }

    #[test]
    fn bitmask_uses_flags_and_flag_traits() {
        let reg = registry();
        let text = emit_bitmask(
            &reg,
            "VkBufferCreateFlags",
            &reg.bitmasks["VkBufferCreateFlags"],
        );
        assert!(text.contains("using BufferCreateFlags = Flags<BufferCreateFlagBits>;"));
        assert!(text.contains(
            "BufferCreateFlagBits::eSparseBinding | BufferCreateFlagBits::eSparseResidency"
        ));
    }

    #[test]
    fn empty_bitmask_synthesizes_placeholder_enum() {
        let reg = registry();
        let text = emit_bitmask(&reg, "VkEmptyFlags", &reg.bitmasks["VkEmptyFlags"]);
        assert!(text.contains("enum class EmptyFlagBits : VkFlags"));
        assert!(text.contains("using EmptyFlags = Flags<EmptyFlagBits>;"));
    }

    #[test]
    fn bitmask_operators_cover_all_four() {
        let reg = registry();
        let text = emit_bitmask_operators(
            "VkBufferCreateFlags",
            &reg.bitmasks["VkBufferCreateFlags"],
        );
        for op in ["operator|", "operator&", "operator^", "operator~"] {
            assert!(text.contains(op), "missing {op}");
        }
        assert!(text.contains(
            "BufferCreateFlags operator|( BufferCreateFlagBits bit0, BufferCreateFlagBits bit1 )"
        ));
    }

    #[test]
    fn bitmask_to_string_joins_set_bits() {
        let reg = registry();
        let text = emit_bitmask_to_string(
            &reg,
            "VkBufferCreateFlags",
            &reg.bitmasks["VkBufferCreateFlags"],
        );
        assert!(text.contains("if ( value & BufferCreateFlagBits::eSparseBinding )"));
        assert!(text.contains("\"SparseBinding | \""));
    }
}
