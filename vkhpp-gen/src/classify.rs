//! Parameter classification — the per-command analysis the overload selector
//! runs on.
//!
//! For each command this derives: which parameters are vectors and where
//! their lengths come from, which non-const pointers are candidate return
//! parameters, which parameters the wrapped overloads hide, and whether a
//! singular variant is derivable.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::extract::SPECIAL_POINTER_TYPES;
use crate::model::{CommandData, Registry};

/// Where a vector parameter's length comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorLen {
    /// The length is an earlier parameter, by index.
    Param(usize),
    /// The length is a member of an earlier struct-typed parameter
    /// (`pAllocateInfo->descriptorSetCount`).
    Member { param: usize, member: String },
}

impl VectorLen {
    pub fn param_index(&self) -> Option<usize> {
        match self {
            VectorLen::Param(i) => Some(*i),
            VectorLen::Member { .. } => None,
        }
    }
}

/// Derived analysis for one command.
#[derive(Debug, Default)]
pub struct Classification {
    /// vector parameter index → length source.
    pub vector_params: IndexMap<usize, VectorLen>,
    /// Non-const pointer parameters, minus the special platform types: the
    /// candidate return parameters.
    pub return_params: Vec<usize>,
    /// Const pointer parameters.
    pub const_pointer_params: Vec<usize>,
    /// Parameters the enhanced overloads do not expose: the owning handle,
    /// lengths of vectors, and the chosen return parameters.
    pub skipped_params: BTreeSet<usize>,
    /// Length-parameter index shared by two value-sized vectors, when a
    /// singular variant is derivable.
    pub singular_len: Option<usize>,
}

impl Classification {
    pub fn return_count(&self) -> usize {
        self.return_params.len()
    }

    pub fn is_vector(&self, param: usize) -> bool {
        self.vector_params.contains_key(&param)
    }

    /// Vectors sized by `len_param`.
    pub fn vectors_sized_by(&self, len_param: usize) -> Vec<usize> {
        self.vector_params
            .iter()
            .filter(|(_, len)| len.param_index() == Some(len_param))
            .map(|(i, _)| *i)
            .collect()
    }
}

/// Classify a command's parameters.
pub fn classify(cmd: &CommandData, reg: &Registry) -> Classification {
    let mut c = Classification::default();

    determine_vector_params(cmd, reg, &mut c);
    determine_pointer_roles(cmd, &mut c);
    c.singular_len = determine_singular(cmd, &c);
    determine_skipped_params(cmd, &mut c);

    c
}

/// A parameter is a vector iff its `len` names an earlier parameter, or a
/// struct-member path rooted at an earlier parameter whose struct type
/// declares that member. `null-terminated` strings and latexmath sizes are
/// not vectors for overload purposes.
fn determine_vector_params(cmd: &CommandData, reg: &Registry, c: &mut Classification) {
    for (index, param) in cmd.params.iter().enumerate() {
        let Some(len) = &param.len else { continue };
        if len == "null-terminated" || len.starts_with("latexmath") {
            continue;
        }
        if let Some(len_index) = cmd.params[..index].iter().position(|p| p.name == *len) {
            c.vector_params.insert(index, VectorLen::Param(len_index));
            continue;
        }
        if let Some((root, member)) = len.split_once("->") {
            let Some(root_index) = cmd.params[..index].iter().position(|p| p.name == root) else {
                continue;
            };
            let root_type = &cmd.params[root_index].type_info.ty;
            let declares_member = reg
                .struct_by_name(root_type)
                .map(|s| s.members.iter().any(|m| m.name == member))
                .unwrap_or(false);
            if declares_member {
                c.vector_params.insert(
                    index,
                    VectorLen::Member {
                        param: root_index,
                        member: member.to_string(),
                    },
                );
            }
        }
    }
}

/// Split pointer parameters into return candidates (non-const) and inputs
/// (const). The platform scraps in [`SPECIAL_POINTER_TYPES`] are non-const
/// by C convention only and never count as returns.
fn determine_pointer_roles(cmd: &CommandData, c: &mut Classification) {
    for (index, param) in cmd.params.iter().enumerate() {
        if param.type_info.is_non_const_pointer()
            && !SPECIAL_POINTER_TYPES.contains(&param.type_info.ty.as_str())
        {
            c.return_params.push(index);
        } else if param.type_info.is_const_pointer() {
            c.const_pointer_params.push(index);
        }
    }
}

/// A singular variant exists when two vectors share one length and that
/// length is a plain value parameter: the wrapped call can fix the length to
/// one and take/return single references.
fn determine_singular(cmd: &CommandData, c: &Classification) -> Option<usize> {
    for len in c.vector_params.values() {
        let Some(len_index) = len.param_index() else { continue };
        if !cmd.params[len_index].type_info.is_value() {
            continue;
        }
        if c.vectors_sized_by(len_index).len() == 2 {
            return Some(len_index);
        }
    }
    None
}

fn determine_skipped_params(cmd: &CommandData, c: &mut Classification) {
    if !cmd.handle.is_empty() {
        c.skipped_params.insert(0);
    }
    for len in c.vector_params.values() {
        if let Some(len_index) = len.param_index() {
            c.skipped_params.insert(len_index);
        }
    }
    for index in &c.return_params {
        c.skipped_params.insert(*index);
    }
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
        <type name="size_t"/>
        <type name="void"/>
        <type category="enum" name="VkResult"/>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_DEVICE"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
        <type category="handle" parent="VkDevice" objtypeenum="VK_OBJECT_TYPE_PIPELINE"><type>VK_DEFINE_NON_DISPATCHABLE_HANDLE</type>(<name>VkPipeline</name>)</type>
        <type category="struct" name="VkAllocateInfo">
            <member><type>uint32_t</type> <name>itemCount</name></member>
        </type>
    </types>
    <enums name="VkResult" type="enum">
        <enum value="0" name="VK_SUCCESS"/>
    </enums>
    <commands>
        <command successcodes="VK_SUCCESS">
            <proto><type>VkResult</type> <name>vkCreatePipelines</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
            <param><type>uint32_t</type> <name>createInfoCount</name></param>
            <param len="createInfoCount">const <type>void</type>* <name>pCreateInfos</name></param>
            <param len="createInfoCount"><type>VkPipeline</type>* <name>pPipelines</name></param>
        </command>
        <command successcodes="VK_SUCCESS">
            <proto><type>VkResult</type> <name>vkAllocateItems</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
            <param>const <type>VkAllocateInfo</type>* <name>pAllocateInfo</name></param>
            <param len="pAllocateInfo-&gt;itemCount"><type>VkPipeline</type>* <name>pItems</name></param>
        </command>
        <command successcodes="VK_SUCCESS">
            <proto><type>VkResult</type> <name>vkEnumerateThings</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
            <param optional="false,true"><type>uint32_t</type>* <name>pCount</name></param>
            <param optional="true" len="pCount"><type>void</type>* <name>pData</name></param>
        </command>
    </commands>
</registry>"#,
        )
        .unwrap()
    }

    #[test]
    fn sibling_length_vectors() {
        let reg = registry();
        let cmd = &reg.commands["vkCreatePipelines"];
        let c = classify(cmd, &reg);

        assert_eq!(c.vector_params.len(), 2);
        assert_eq!(c.vector_params[&2], VectorLen::Param(1));
        assert_eq!(c.vector_params[&3], VectorLen::Param(1));
        assert_eq!(c.return_params, vec![3]);
        assert_eq!(c.const_pointer_params, vec![2]);
        // handle + shared length + return param are all hidden.
        assert_eq!(
            c.skipped_params.iter().copied().collect::<Vec<_>>(),
            vec![0, 1, 3]
        );
        assert_eq!(c.singular_len, Some(1));
    }

    #[test]
    fn struct_member_length_vector() {
        let reg = registry();
        let cmd = &reg.commands["vkAllocateItems"];
        let c = classify(cmd, &reg);

        assert_eq!(
            c.vector_params[&2],
            VectorLen::Member {
                param: 1,
                member: "itemCount".to_string()
            }
        );
        // A struct-member length has no parameter to skip.
        assert_eq!(
            c.skipped_params.iter().copied().collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert!(c.singular_len.is_none());
    }

    #[test]
    fn enumerate_shape_returns_count_and_vector() {
        let reg = registry();
        let cmd = &reg.commands["vkEnumerateThings"];
        let c = classify(cmd, &reg);

        // pCount is a non-const pointer and also the length of pData.
        assert_eq!(c.return_params, vec![1, 2]);
        assert_eq!(c.vector_params[&2], VectorLen::Param(1));
        assert!(c.singular_len.is_none());
    }
}
