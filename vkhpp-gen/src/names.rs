//! Naming utilities — conversions between the registry's C spellings and the
//! generated C++ spellings.
//!
//! The registry uses `Vk`-prefixed PascalCase for types, `vk`-prefixed
//! camelCase for commands and `VK_`-prefixed SCREAMING_SNAKE for enum values
//! and macros. Vendor tags (`KHR`, `EXT`, `NV`, ...) always sit at the end of
//! a name and must keep their casing through every conversion.

/// Upper-case the first character, leave the rest untouched.
pub fn start_upper_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lower-case the first character, leave the rest untouched.
pub fn start_lower_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Strip `prefix` if present.
pub fn strip_prefix(s: &str, prefix: &str) -> String {
    s.strip_prefix(prefix).unwrap_or(s).to_string()
}

/// Strip `postfix` if present.
pub fn strip_postfix(s: &str, postfix: &str) -> String {
    s.strip_suffix(postfix).unwrap_or(s).to_string()
}

/// Convert SCREAMING_SNAKE_CASE to CamelCase.
///
/// A character following an underscore or a digit keeps its case, everything
/// else inside a token is lowered. This keeps spellings like `2D` or `4X4`
/// intact:
///
/// ```
/// use vkhpp_gen::names::to_camel_case;
///
/// assert_eq!(to_camel_case("STRUCTURE_TYPE"), "StructureType");
/// assert_eq!(to_camel_case("IMAGE_TYPE_2D"), "ImageType2D");
/// assert_eq!(to_camel_case("ASTC_4X4"), "Astc4X4");
/// ```
pub fn to_camel_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut keep_upper = true;
    for c in value.chars() {
        if c == '_' {
            keep_upper = true;
        } else if c.is_ascii_digit() {
            keep_upper = true;
            result.push(c);
        } else if keep_upper {
            result.push(c);
            keep_upper = false;
        } else {
            result.push(c.to_ascii_lowercase());
        }
    }
    result
}

/// Convert CamelCase to SCREAMING_SNAKE_CASE.
///
/// An underscore is inserted before every upper-case character that follows a
/// lower-case character or a digit:
///
/// ```
/// use vkhpp_gen::names::to_upper_snake;
///
/// assert_eq!(to_upper_snake("VkStructureType"), "VK_STRUCTURE_TYPE");
/// assert_eq!(to_upper_snake("VkBufferCreateFlagBits"), "VK_BUFFER_CREATE_FLAG_BITS");
/// ```
pub fn to_upper_snake(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in value.chars() {
        if c.is_ascii_uppercase() && prev_lower_or_digit {
            result.push('_');
        }
        prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
        result.push(c.to_ascii_uppercase());
    }
    result
}

/// Find the vendor tag `name` ends with, if any.
pub fn extract_tag<'a, I>(name: &str, tags: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .filter(|t| name.ends_with(t.as_str()))
        .max_by_key(|t| t.len())
        .cloned()
}

/// Remove a trailing plural `s` (used to derive singular-variant names, e.g.
/// `pProperties` → `pPropertie` is avoided by the `ies` rule).
pub fn strip_plural_s(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = name.strip_suffix('s') {
        stem.to_string()
    } else {
        name.to_string()
    }
}

/// The SCREAMING prefix shared by all values of an enum.
///
/// `VkResult` values carry only the `VK_` prefix; bitmask value names drop
/// everything from `FlagBits` on; plain enums use the full enum name.
pub fn enum_value_prefix(enum_name: &str, is_bitmask: bool) -> String {
    if enum_name == "VkResult" {
        return "VK_".to_string();
    }
    if is_bitmask {
        if let Some(pos) = enum_name.find("FlagBits") {
            return to_upper_snake(&enum_name[..pos]) + "_";
        }
    }
    to_upper_snake(enum_name) + "_"
}

/// Derive the C++ enum value spelling from a C one.
///
/// Strips the enum's value prefix (falling back to plain `VK_`), the enum's
/// vendor tag, and for bitmasks the trailing `_BIT`, camel-cases the rest and
/// prepends `e`. When the value carries its own vendor tag, the tag stays
/// SCREAMING at the end of the result:
///
/// ```
/// use vkhpp_gen::names::create_enum_value_name;
///
/// let tags = vec!["KHR".to_string(), "EXT".to_string()];
/// assert_eq!(create_enum_value_name("VK_SUCCESS", "VK_", false, &tags), "eSuccess");
/// assert_eq!(
///     create_enum_value_name("VK_BUFFER_CREATE_SPARSE_BINDING_BIT", "VK_BUFFER_CREATE_", true, &tags),
///     "eSparseBinding"
/// );
/// assert_eq!(
///     create_enum_value_name("VK_PRESENT_MODE_FIFO_LATEST_READY_EXT", "VK_PRESENT_MODE_", false, &tags),
///     "eFifoLatestReadyEXT"
/// );
/// ```
pub fn create_enum_value_name(
    c_name: &str,
    prefix: &str,
    is_bitmask: bool,
    tags: &[String],
) -> String {
    let mut work = if c_name.starts_with(prefix) {
        strip_prefix(c_name, prefix)
    } else {
        strip_prefix(c_name, "VK_")
    };

    let tag = extract_tag(&work, tags.iter());
    if let Some(tag) = &tag {
        work = strip_postfix(&work, &format!("_{tag}"));
    }
    if is_bitmask {
        work = strip_postfix(&work, "_BIT");
    }

    let mut result = format!("e{}", to_camel_case(&work));
    if let Some(tag) = tag {
        result.push_str(&tag);
    }
    result
}

/// C type name → C++ type name (`VkBufferCreateInfo` → `BufferCreateInfo`).
pub fn cpp_type_name(c_name: &str) -> String {
    strip_prefix(c_name, "Vk")
}

/// C command name → C++ method name (`vkCreateBuffer` → `createBuffer`).
pub fn cpp_command_name(c_name: &str) -> String {
    start_lower_case(&strip_prefix(c_name, "vk"))
}

/// Derive the singular C++ name for a vector command variant: strips a
/// leading pointer `p` and the plural suffix (`pProperties` → `property`).
pub fn singular_param_name(param_name: &str) -> String {
    start_lower_case(&strip_plural_s(&strip_array_pointer_prefix(param_name)))
}

/// Drop the Hungarian pointer prefix from a parameter name
/// (`pCreateInfo` → `CreateInfo`, `ppData` → `Data`).
pub fn strip_array_pointer_prefix(name: &str) -> String {
    let stripped = name
        .strip_prefix("pp")
        .or_else(|| name.strip_prefix('p'))
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        .unwrap_or(name);
    stripped.to_string()
}

/// Parameter name as exposed in an enhanced signature: pointer prefix
/// dropped, first letter lowered (`pCreateInfo` → `createInfo`).
pub fn enhanced_param_name(name: &str) -> String {
    start_lower_case(&strip_array_pointer_prefix(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        ["KHR", "EXT", "NV", "AMD", "GOOGLE"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn camel_case_handles_digit_runs() {
        assert_eq!(to_camel_case("SAMPLE_COUNT_1"), "SampleCount1");
        assert_eq!(to_camel_case("IMAGE_TYPE_1D"), "ImageType1D");
        assert_eq!(to_camel_case("R8G8B8A8_UNORM"), "R8G8B8A8Unorm");
    }

    #[test]
    fn upper_snake_round_trips_type_names() {
        assert_eq!(to_upper_snake("VkImageType"), "VK_IMAGE_TYPE");
        assert_eq!(to_upper_snake("VkResult"), "VK_RESULT");
        assert_eq!(
            to_upper_snake("VkPhysicalDeviceFeatures2"),
            "VK_PHYSICAL_DEVICE_FEATURES_2"
        );
    }

    #[test]
    fn enum_prefix_special_cases() {
        assert_eq!(enum_value_prefix("VkResult", false), "VK_");
        assert_eq!(
            enum_value_prefix("VkStructureType", false),
            "VK_STRUCTURE_TYPE_"
        );
        assert_eq!(
            enum_value_prefix("VkBufferCreateFlagBits", true),
            "VK_BUFFER_CREATE_"
        );
        assert_eq!(
            enum_value_prefix("VkDebugReportFlagBitsEXT", true),
            "VK_DEBUG_REPORT_"
        );
    }

    #[test]
    fn result_values() {
        assert_eq!(
            create_enum_value_name("VK_SUCCESS", "VK_", false, &tags()),
            "eSuccess"
        );
        assert_eq!(
            create_enum_value_name("VK_ERROR_OUT_OF_HOST_MEMORY", "VK_", false, &tags()),
            "eErrorOutOfHostMemory"
        );
        assert_eq!(
            create_enum_value_name("VK_INCOMPLETE", "VK_", false, &tags()),
            "eIncomplete"
        );
    }

    #[test]
    fn bitmask_values_drop_bit_suffix() {
        assert_eq!(
            create_enum_value_name(
                "VK_BUFFER_CREATE_SPARSE_BINDING_BIT",
                "VK_BUFFER_CREATE_",
                true,
                &tags()
            ),
            "eSparseBinding"
        );
    }

    #[test]
    fn tags_stay_screaming() {
        assert_eq!(
            create_enum_value_name(
                "VK_COLOR_SPACE_DISPLAY_P3_NONLINEAR_EXT",
                "VK_COLOR_SPACE_",
                false,
                &tags()
            ),
            "eDisplayP3NonlinearEXT"
        );
        assert_eq!(
            create_enum_value_name(
                "VK_DEBUG_REPORT_ERROR_BIT_EXT",
                "VK_DEBUG_REPORT_",
                true,
                &tags()
            ),
            "eErrorEXT"
        );
    }

    #[test]
    fn command_and_type_spellings() {
        assert_eq!(cpp_type_name("VkBufferCreateInfo"), "BufferCreateInfo");
        assert_eq!(cpp_command_name("vkCreateBuffer"), "createBuffer");
        assert_eq!(cpp_command_name("vkGetDeviceQueue"), "getDeviceQueue");
    }

    #[test]
    fn singular_names() {
        assert_eq!(singular_param_name("pProperties"), "property");
        assert_eq!(singular_param_name("pSwapchains"), "swapchain");
        assert_eq!(enhanced_param_name("pCreateInfo"), "createInfo");
        assert_eq!(enhanced_param_name("ppData"), "data");
        assert_eq!(enhanced_param_name("physicalDevice"), "physicalDevice");
    }
}
