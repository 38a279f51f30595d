//! Cross-reference validation — runs once after ingestion.
//!
//! Walks every name-keyed reference in the model and every domain invariant,
//! collecting all violations before failing, so a registry with several
//! problems reports them in one pass instead of one per run.

use anyhow::Result;
use tracing::{debug, warn};

use crate::extract::C_PRIMITIVES;
use crate::model::*;

/// Reserved `sType` values claimed by the loader, never by a struct.
const RESERVED_STRUCTURE_TYPES: &[&str] = &[
    "VK_STRUCTURE_TYPE_LOADER_INSTANCE_CREATE_INFO",
    "VK_STRUCTURE_TYPE_LOADER_DEVICE_CREATE_INFO",
];

/// Validate the registry. Returns an error listing every violation found.
pub fn validate(reg: &Registry) -> Result<()> {
    let mut issues: Vec<String> = Vec::new();

    check_base_types(reg, &mut issues);
    check_bitmasks(reg, &mut issues);
    check_enum_aliases(reg, &mut issues);
    check_commands(reg, &mut issues);
    check_extensions(reg, &mut issues);
    check_handles(reg, &mut issues);
    check_structs(reg, &mut issues);
    check_structure_types(reg, &mut issues);

    if issues.is_empty() {
        debug!("cross-reference validation passed");
        return Ok(());
    }
    let mut msg = format!("{} validation issue(s) found:\n", issues.len());
    for issue in &issues {
        msg.push_str(&format!("\n  • {issue}"));
    }
    anyhow::bail!("{msg}");
}

/// True when `name` resolves to a declared type or a C primitive.
fn type_exists(reg: &Registry, name: &str) -> bool {
    reg.types.contains_key(name) || C_PRIMITIVES.contains(&name)
}

fn check_base_types(reg: &Registry, issues: &mut Vec<String>) {
    for (name, data) in &reg.base_types {
        let ty = &data.type_info.ty;
        if !ty.is_empty() && !type_exists(reg, ty) {
            issues.push(format!(
                "base type `{name}` (line {}) typedefs unknown type `{ty}`",
                data.xml_line
            ));
        }
    }
}

fn check_bitmasks(reg: &Registry, issues: &mut Vec<String>) {
    for (name, data) in &reg.bitmasks {
        if let Some(alias) = &data.alias {
            if !reg.bitmasks.contains_key(alias) {
                issues.push(format!(
                    "bitmask `{name}` (line {}) aliases unknown bitmask `{alias}`",
                    data.xml_line
                ));
            }
            continue;
        }
        if data.requirements.is_empty() {
            continue;
        }
        match reg.enums.get(&data.requirements) {
            None => issues.push(format!(
                "bitmask `{name}` (line {}) requires unknown enum `{}`",
                data.xml_line, data.requirements
            )),
            Some(e) if !e.is_bitmask && e.alias.is_none() => issues.push(format!(
                "bitmask `{name}` requires `{}`, which is not a bit enum",
                data.requirements
            )),
            Some(_) => {}
        }
    }
}

fn check_enum_aliases(reg: &Registry, issues: &mut Vec<String>) {
    for (name, data) in &reg.enums {
        if let Some(alias) = &data.alias {
            if !reg.enums.contains_key(alias) {
                issues.push(format!("enum `{name}` aliases unknown enum `{alias}`"));
            }
        }
        for alias_name in data.aliases.keys() {
            if data.resolve_alias(alias_name).is_none() {
                issues.push(format!(
                    "enum `{name}`: alias `{alias_name}` does not terminate at an existing value"
                ));
            }
        }
    }
}

fn check_commands(reg: &Registry, issues: &mut Vec<String>) {
    let result_enum = reg.enums.get("VkResult");
    for (name, cmd) in &reg.commands {
        if cmd.params.is_empty() {
            warn!(command = %name, "command has no parameters");
        }
        if cmd.return_type == "VkResult" && cmd.success_codes.is_empty() {
            issues.push(format!(
                "command `{name}` (line {}) returns VkResult but declares no success codes",
                cmd.xml_line
            ));
        }
        for code in cmd.success_codes.iter().chain(&cmd.error_codes) {
            let known = result_enum
                .map(|e| e.resolve_alias(code).is_some())
                .unwrap_or(false);
            if !known {
                issues.push(format!(
                    "command `{name}`: result code `{code}` is not a known VkResult value"
                ));
            }
        }
        if !type_exists(reg, &cmd.return_type) {
            issues.push(format!(
                "command `{name}`: unknown return type `{}`",
                cmd.return_type
            ));
        }
        for param in &cmd.params {
            if !type_exists(reg, &param.type_info.ty) {
                issues.push(format!(
                    "command `{name}`: parameter `{}` (line {}) has unknown type `{}`",
                    param.name, param.xml_line, param.type_info.ty
                ));
            }
        }
        // At most one platform guard per command.
        let protects: indexmap::IndexSet<&str> = cmd
            .extensions
            .iter()
            .filter_map(|e| reg.protect_for_extension(e))
            .collect();
        if protects.len() > 1 {
            issues.push(format!(
                "command `{name}` is guarded by more than one platform macro: {protects:?}"
            ));
        }
    }
}

fn check_extensions(reg: &Registry, issues: &mut Vec<String>) {
    let lifecycle_target_exists =
        |t: &str| t.is_empty() || reg.extensions.contains_key(t) || reg.features.contains_key(t);
    for (name, ext) in &reg.extensions {
        if !ext.platform.is_empty() && !reg.platforms.contains_key(&ext.platform) {
            issues.push(format!(
                "extension `{name}` names unknown platform `{}`",
                ext.platform
            ));
        }
        for (field, target) in [
            ("promotedto", &ext.promoted_to),
            ("deprecatedby", &ext.deprecated_by),
            ("obsoletedby", &ext.obsoleted_by),
        ] {
            if !lifecycle_target_exists(target) {
                issues.push(format!(
                    "extension `{name}`: {field} target `{target}` is neither an extension nor a feature"
                ));
            }
        }
    }
}

fn check_handles(reg: &Registry, issues: &mut Vec<String>) {
    let object_type = reg.enums.get("VkObjectType");
    for (name, handle) in &reg.handles {
        if name.is_empty() || handle.alias.is_some() {
            continue;
        }
        for parent in &handle.parents {
            if !reg.handles.contains_key(parent) {
                issues.push(format!(
                    "handle `{name}` (line {}) names unknown parent `{parent}`",
                    handle.xml_line
                ));
            }
        }
        if let Some(ot) = object_type {
            if !handle.obj_type_enum.is_empty()
                && ot.resolve_alias(&handle.obj_type_enum).is_none()
            {
                issues.push(format!(
                    "handle `{name}`: objtypeenum `{}` is not a VkObjectType value",
                    handle.obj_type_enum
                ));
            }
        }
        if !handle.delete_command.is_empty() && !reg.commands.contains_key(&handle.delete_command)
        {
            issues.push(format!(
                "handle `{name}`: delete command `{}` does not exist",
                handle.delete_command
            ));
        }
    }

    // Conversely, every non-unknown ObjectType value must name a handle.
    if let Some(ot) = object_type {
        for value in &ot.values {
            if value.c_name == "VK_OBJECT_TYPE_UNKNOWN" {
                continue;
            }
            let claimed = reg
                .handles
                .values()
                .any(|h| h.obj_type_enum == value.c_name);
            if !claimed {
                issues.push(format!(
                    "VkObjectType value `{}` is not claimed by any handle",
                    value.c_name
                ));
            }
        }
    }
}

fn check_structs(reg: &Registry, issues: &mut Vec<String>) {
    for (name, s) in &reg.structs {
        for target in &s.struct_extends {
            if reg.struct_by_name(target).is_none() {
                issues.push(format!(
                    "struct `{name}` (line {}) extends unknown struct `{target}`",
                    s.xml_line
                ));
            }
        }
        for (index, member) in s.members.iter().enumerate() {
            if !type_exists(reg, &member.type_info.ty) {
                issues.push(format!(
                    "struct `{name}`: member `{}` has unknown type `{}`",
                    member.name, member.type_info.ty
                ));
            }
            // A len naming a sibling member must refer to an earlier one.
            for len in &member.len {
                if len == "null-terminated" || len.starts_with("latexmath") {
                    continue;
                }
                let len_root = len.split("->").next().unwrap_or(len);
                if let Some(pos) = s.members.iter().position(|m| m.name == len_root) {
                    if pos >= index {
                        issues.push(format!(
                            "struct `{name}`: member `{}` is sized by `{len_root}`, which is not declared before it",
                            member.name
                        ));
                    }
                }
            }
            if let Some(selector) = &member.selector {
                let selector_member = s.members.iter().find(|m| m.name == *selector);
                match selector_member {
                    None => issues.push(format!(
                        "struct `{name}`: member `{}` selects on unknown sibling `{selector}`",
                        member.name
                    )),
                    Some(sel) => {
                        if !reg.enums.contains_key(&sel.type_info.ty) {
                            issues.push(format!(
                                "struct `{name}`: selector `{selector}` is not of enum type"
                            ));
                        }
                    }
                }
            }
        }
    }
}

/// Every `sType` value in `VkStructureType` must be claimed by exactly one
/// struct; reserved loader values are exempt.
fn check_structure_types(reg: &Registry, issues: &mut Vec<String>) {
    let Some(structure_type) = reg.enums.get("VkStructureType") else {
        return;
    };
    for value in &structure_type.values {
        if RESERVED_STRUCTURE_TYPES.contains(&value.c_name.as_str()) {
            continue;
        }
        let users: Vec<&String> = reg
            .structs
            .iter()
            .filter(|(_, s)| s.stype_value() == Some(value.c_name.as_str()))
            .map(|(name, _)| name)
            .collect();
        match users.len() {
            0 => issues.push(format!(
                "VkStructureType value `{}` is not used by any struct",
                value.c_name
            )),
            1 => {}
            _ => issues.push(format!(
                "VkStructureType value `{}` is used by more than one struct: {users:?}",
                value.c_name
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_registry;

    const VALID: &str = r#"
<registry>
    <types>
        <type name="uint32_t"/>
        <type category="enum" name="VkResult"/>
        <type category="enum" name="VkObjectType"/>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_INSTANCE"><type>VK_DEFINE_HANDLE</type>(<name>VkInstance</name>)</type>
        <type category="struct" name="VkThing">
            <member><type>uint32_t</type> <name>count</name></member>
            <member len="count"><type>uint32_t</type> <name>pItems</name></member>
        </type>
    </types>
    <enums name="VkResult" type="enum">
        <enum value="0" name="VK_SUCCESS"/>
    </enums>
    <enums name="VkObjectType" type="enum">
        <enum value="0" name="VK_OBJECT_TYPE_UNKNOWN"/>
        <enum value="1" name="VK_OBJECT_TYPE_INSTANCE"/>
    </enums>
    <commands>
        <command successcodes="VK_SUCCESS">
            <proto><type>VkResult</type> <name>vkDoThing</name></proto>
            <param><type>VkInstance</type> <name>instance</name></param>
        </command>
    </commands>
</registry>"#;

    #[test]
    fn valid_registry_passes() {
        let reg = parse_registry(VALID).unwrap();
        validate(&reg).unwrap();
    }

    #[test]
    fn unknown_result_code_is_reported() {
        let xml = VALID.replace("successcodes=\"VK_SUCCESS\"", "successcodes=\"VK_BOGUS\"");
        let reg = parse_registry(&xml).unwrap();
        let err = validate(&reg).unwrap_err().to_string();
        assert!(err.contains("VK_BOGUS"), "{err}");
    }

    #[test]
    fn result_command_without_success_code_is_reported() {
        let xml = VALID.replace(" successcodes=\"VK_SUCCESS\"", "");
        let reg = parse_registry(&xml).unwrap();
        let err = validate(&reg).unwrap_err().to_string();
        assert!(err.contains("no success codes"), "{err}");
    }

    #[test]
    fn unclaimed_object_type_is_reported() {
        let xml = VALID.replace(
            r#"<enum value="1" name="VK_OBJECT_TYPE_INSTANCE"/>"#,
            r#"<enum value="1" name="VK_OBJECT_TYPE_INSTANCE"/>
        <enum value="2" name="VK_OBJECT_TYPE_BUFFER"/>"#,
        );
        let reg = parse_registry(&xml).unwrap();
        let err = validate(&reg).unwrap_err().to_string();
        assert!(err.contains("VK_OBJECT_TYPE_BUFFER"), "{err}");
    }

    #[test]
    fn late_len_member_is_reported() {
        let xml = VALID.replace(
            r#"<member><type>uint32_t</type> <name>count</name></member>
            <member len="count"><type>uint32_t</type> <name>pItems</name></member>"#,
            r#"<member len="count"><type>uint32_t</type> <name>pItems</name></member>
            <member><type>uint32_t</type> <name>count</name></member>"#,
        );
        let reg = parse_registry(&xml).unwrap();
        let err = validate(&reg).unwrap_err().to_string();
        assert!(err.contains("not declared before"), "{err}");
    }
}
