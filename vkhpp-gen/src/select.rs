//! Overload selection — maps a command's classification onto the set of
//! C++ overloads to emit.
//!
//! The decision procedure branches on the return-parameter count first, then
//! on shape discriminators (handle-ness, vector-ness, length kind, chain
//! anchors). Each selected overload is a tagged descriptor the emitter
//! pattern-matches on; a command matching no known shape is skipped with a
//! warning and counted, never fatal.

use tracing::warn;

use crate::classify::Classification;
use crate::model::{CommandData, Registry};

/// One overload to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    pub kind: OverloadKind,
    /// RAII flavor returning `UniqueHandle`s.
    pub unique: bool,
    /// Flavor taking an explicit vector-allocator template argument.
    pub with_allocator: bool,
    pub deprecated: bool,
}

impl Overload {
    fn new(kind: OverloadKind) -> Self {
        Overload {
            kind,
            unique: false,
            with_allocator: false,
            deprecated: false,
        }
    }

    fn unique(kind: OverloadKind) -> Self {
        Overload {
            unique: true,
            ..Overload::new(kind)
        }
    }

    fn with_allocator(kind: OverloadKind) -> Self {
        Overload {
            with_allocator: true,
            ..Overload::new(kind)
        }
    }

    fn deprecated(kind: OverloadKind) -> Self {
        Overload {
            deprecated: true,
            ..Overload::new(kind)
        }
    }
}

/// The overload shapes the emitter knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadKind {
    /// Raw mirror of the C signature over C++ types.
    Standard,
    /// Reference/value signature: single return value or void, errors via
    /// result plumbing.
    Enhanced,
    /// Enhanced flavor returning a sized `std::vector`.
    EnhancedVector,
    /// Vector command with the length fixed to one, single references.
    Singular,
    /// Returned struct templated as a `StructureChain` anchor.
    Chained,
    /// Two-step size-then-fill returning a `std::vector`, retrying while the
    /// call reports `eIncomplete`.
    Enumerate,
    /// Enumerate flavor filling a vector of `StructureChain`s.
    EnumerateChained,
    /// Two co-sized output vectors filled by one call.
    TwoVectors,
}

/// The selector's verdict for one command.
#[derive(Debug, Default)]
pub struct Selection {
    pub overloads: Vec<Overload>,
}

/// Pick the overload set for `name`. `None` means the command matches no
/// known shape and is skipped.
pub fn select(
    name: &str,
    cmd: &CommandData,
    cls: &Classification,
    reg: &Registry,
) -> Option<Selection> {
    if cmd.params.is_empty() {
        // Nothing to wrap; emit no overloads but do not treat as a miss.
        return Some(Selection::default());
    }

    let overloads = match cls.return_count() {
        0 => select_zero_returns(cmd, cls),
        1 => select_one_return(name, cmd, cls, reg),
        2 => select_two_returns(cmd, cls, reg),
        3 => select_three_returns(cmd, cls),
        _ => None,
    };

    match overloads {
        Some(overloads) => Some(Selection { overloads }),
        None => {
            warn!(
                command = name,
                returns = cls.return_count(),
                "never encountered a function like this; skipping"
            );
            None
        }
    }
}

fn select_zero_returns(cmd: &CommandData, cls: &Classification) -> Option<Vec<Overload>> {
    let has_non_void_const_pointer = cls
        .const_pointer_params
        .iter()
        .any(|i| cmd.params[*i].type_info.ty != "void");

    if cls.vector_params.is_empty() && !has_non_void_const_pointer {
        if cmd.return_type == "VkResult" {
            // The enhanced flavor only differs in error plumbing; both are
            // emitted and macro-gated in the header.
            Some(vec![
                Overload::new(OverloadKind::Standard),
                Overload::new(OverloadKind::Enhanced),
            ])
        } else {
            Some(vec![Overload::new(OverloadKind::Standard)])
        }
    } else {
        Some(vec![
            Overload::new(OverloadKind::Standard),
            Overload::new(OverloadKind::Enhanced),
        ])
    }
}

fn select_one_return(
    name: &str,
    cmd: &CommandData,
    cls: &Classification,
    reg: &Registry,
) -> Option<Vec<Overload>> {
    let ret = cls.return_params[0];
    let ret_type = &cmd.params[ret].type_info.ty;

    if reg.is_handle(ret_type) {
        return select_one_returned_handle(name, cmd, cls, ret);
    }

    if reg.is_chain_anchor(ret_type) && !cls.is_vector(ret) {
        return Some(vec![
            Overload::new(OverloadKind::Standard),
            Overload::new(OverloadKind::Enhanced),
            Overload::new(OverloadKind::Chained),
        ]);
    }

    if !cls.is_vector(ret) && matches!(cmd.return_type.as_str(), "VkResult" | "void") {
        return Some(vec![
            Overload::new(OverloadKind::Standard),
            Overload::new(OverloadKind::Enhanced),
        ]);
    }

    // A returned vector of raw bytes sized by a value parameter
    // (vkGetQueryPoolResults style) additionally gets a singular flavor.
    if cls.is_vector(ret) && ret_type == "void" {
        let len_is_value = cls.vector_params[&ret]
            .param_index()
            .map(|i| cmd.params[i].type_info.is_value())
            .unwrap_or(false);
        if len_is_value {
            return Some(vec![
                Overload::new(OverloadKind::Standard),
                Overload::new(OverloadKind::EnhancedVector),
                Overload::new(OverloadKind::Singular),
            ]);
        }
    }

    None
}

fn select_one_returned_handle(
    name: &str,
    cmd: &CommandData,
    cls: &Classification,
    ret: usize,
) -> Option<Vec<Overload>> {
    if !cls.is_vector(ret) {
        if cmd.return_type == "VkResult" {
            return Some(vec![
                Overload::new(OverloadKind::Standard),
                Overload::new(OverloadKind::Enhanced),
                Overload::unique(OverloadKind::Enhanced),
            ]);
        }
        if cmd.return_type == "void" && name.starts_with("vkGet") {
            return Some(vec![
                Overload::new(OverloadKind::Standard),
                Overload::new(OverloadKind::Enhanced),
            ]);
        }
        return None;
    }

    match cls.vector_params[&ret].param_index() {
        // Value-typed shared length over two co-sized vectors
        // (vkCreateGraphicsPipelines): the full flavor family.
        Some(len) if cmd.params[len].type_info.is_value() => {
            if cls.singular_len != Some(len) {
                return None;
            }
            Some(vec![
                Overload::new(OverloadKind::Standard),
                Overload::new(OverloadKind::EnhancedVector),
                Overload::with_allocator(OverloadKind::EnhancedVector),
                Overload::new(OverloadKind::Singular),
                Overload::unique(OverloadKind::EnhancedVector),
                Overload {
                    unique: true,
                    ..Overload::with_allocator(OverloadKind::EnhancedVector)
                },
                Overload::unique(OverloadKind::Singular),
            ])
        }
        // Struct-member length (vkAllocateDescriptorSets): no singular.
        None => Some(vec![
            Overload::new(OverloadKind::Standard),
            Overload::new(OverloadKind::EnhancedVector),
            Overload::with_allocator(OverloadKind::EnhancedVector),
            Overload::unique(OverloadKind::EnhancedVector),
            Overload {
                unique: true,
                ..Overload::with_allocator(OverloadKind::EnhancedVector)
            },
        ]),
        _ => None,
    }
}

fn select_two_returns(
    cmd: &CommandData,
    cls: &Classification,
    reg: &Registry,
) -> Option<Vec<Overload>> {
    let (first, second) = (cls.return_params[0], cls.return_params[1]);

    // Size query + chained fill (vkGetPhysicalDeviceQueueFamilyProperties2).
    let second_type = &cmd.params[second].type_info.ty;
    if cls.is_vector(second)
        && cls.vector_params[&second].param_index() == Some(first)
        && reg.is_chain_anchor(second_type)
    {
        return Some(vec![
            Overload::new(OverloadKind::Standard),
            Overload::new(OverloadKind::Enumerate),
            Overload::with_allocator(OverloadKind::Enumerate),
            Overload::new(OverloadKind::EnumerateChained),
        ]);
    }

    // Classic enumerate pair: the vector's size is the other return.
    if cls.is_vector(second)
        && !cls.is_vector(first)
        && cls.vector_params[&second].param_index() == Some(first)
    {
        return Some(vec![
            Overload::new(OverloadKind::Standard),
            Overload::new(OverloadKind::Enumerate),
            Overload::with_allocator(OverloadKind::Enumerate),
        ]);
    }

    // Returned vector plus a returned scalar (vkGetCalibratedTimestampsKHR):
    // the old combined flavor survives as deprecated.
    if cls.is_vector(first) && !cls.is_vector(second) && cmd.params[second].type_info.ty != "void"
    {
        return Some(vec![
            Overload::new(OverloadKind::Standard),
            Overload::deprecated(OverloadKind::EnhancedVector),
            Overload::new(OverloadKind::EnhancedVector),
            Overload::with_allocator(OverloadKind::EnhancedVector),
        ]);
    }

    None
}

fn select_three_returns(cmd: &CommandData, cls: &Classification) -> Option<Vec<Overload>> {
    // One returned count sizing two returned vectors
    // (vkEnumeratePhysicalDeviceQueueFamilyPerformanceQueryCountersKHR).
    let count = cls
        .return_params
        .iter()
        .find(|i| !cls.is_vector(**i) && cmd.params[**i].type_info.ty == "uint32_t")?;
    let vectors = cls.vectors_sized_by(*count);
    let both_returned = vectors.len() == 2
        && vectors.iter().all(|v| cls.return_params.contains(v));
    if both_returned {
        return Some(vec![
            Overload::new(OverloadKind::Standard),
            Overload::deprecated(OverloadKind::TwoVectors),
            Overload::new(OverloadKind::TwoVectors),
            Overload::with_allocator(OverloadKind::TwoVectors),
        ]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::extract::parse_registry;

    fn registry() -> Registry {
        parse_registry(
            r#"
<registry>
    <types>
        <type name="uint32_t"/>
        <type name="void"/>
        <type category="enum" name="VkResult"/>
        <type category="enum" name="VkStructureType"/>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_DEVICE"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_PHYSICAL_DEVICE"><type>VK_DEFINE_HANDLE</type>(<name>VkPhysicalDevice</name>)</type>
        <type category="handle" parent="VkDevice" objtypeenum="VK_OBJECT_TYPE_BUFFER"><type>VK_DEFINE_NON_DISPATCHABLE_HANDLE</type>(<name>VkBuffer</name>)</type>
        <type category="struct" name="VkAllocationCallbacks">
            <member><type>void</type>* <name>pUserData</name></member>
        </type>
        <type category="struct" name="VkBufferCreateInfo">
            <member values="VK_STRUCTURE_TYPE_BUFFER_CREATE_INFO"><type>VkStructureType</type> <name>sType</name></member>
            <member><type>uint32_t</type> <name>size</name></member>
        </type>
        <type category="struct" name="VkExtensionProperties">
            <member><type>uint32_t</type> <name>specVersion</name></member>
        </type>
        <type category="struct" name="VkMemoryProperties2">
            <member values="VK_STRUCTURE_TYPE_MEMORY_PROPERTIES_2"><type>VkStructureType</type> <name>sType</name></member>
        </type>
        <type category="struct" name="VkMemoryBudget" structextends="VkMemoryProperties2">
            <member><type>uint32_t</type> <name>budget</name></member>
        </type>
    </types>
    <enums name="VkResult" type="enum">
        <enum value="0" name="VK_SUCCESS"/>
        <enum value="5" name="VK_INCOMPLETE"/>
    </enums>
    <enums name="VkStructureType" type="enum">
        <enum value="0" name="VK_STRUCTURE_TYPE_BUFFER_CREATE_INFO"/>
        <enum value="1" name="VK_STRUCTURE_TYPE_MEMORY_PROPERTIES_2"/>
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
        <command successcodes="VK_SUCCESS,VK_INCOMPLETE">
            <proto><type>VkResult</type> <name>vkEnumerateExtensionProperties</name></proto>
            <param><type>VkPhysicalDevice</type> <name>physicalDevice</name></param>
            <param optional="false,true"><type>uint32_t</type>* <name>pPropertyCount</name></param>
            <param optional="true" len="pPropertyCount"><type>VkExtensionProperties</type>* <name>pProperties</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkGetMemoryProperties</name></proto>
            <param><type>VkPhysicalDevice</type> <name>physicalDevice</name></param>
            <param><type>VkMemoryProperties2</type>* <name>pMemoryProperties</name></param>
        </command>
    </commands>
</registry>"#,
        )
        .unwrap()
    }

    fn overloads_for(reg: &Registry, name: &str) -> Vec<Overload> {
        let cmd = &reg.commands[name];
        let cls = classify(cmd, reg);
        select(name, cmd, &cls, reg).expect("shape must match").overloads
    }

    #[test]
    fn create_buffer_gets_standard_enhanced_unique() {
        let reg = registry();
        let overloads = overloads_for(&reg, "vkCreateBuffer");
        assert_eq!(
            overloads,
            vec![
                Overload::new(OverloadKind::Standard),
                Overload::new(OverloadKind::Enhanced),
                Overload::unique(OverloadKind::Enhanced),
            ]
        );
    }

    #[test]
    fn destroy_gets_standard_and_enhanced() {
        let reg = registry();
        let overloads = overloads_for(&reg, "vkDestroyBuffer");
        assert_eq!(
            overloads,
            vec![
                Overload::new(OverloadKind::Standard),
                Overload::new(OverloadKind::Enhanced),
            ]
        );
    }

    #[test]
    fn enumerate_pair_gets_enumerate_shape() {
        let reg = registry();
        let overloads = overloads_for(&reg, "vkEnumerateExtensionProperties");
        assert_eq!(overloads[0].kind, OverloadKind::Standard);
        assert_eq!(overloads[1].kind, OverloadKind::Enumerate);
        assert!(overloads[2].with_allocator);
    }

    #[test]
    fn chain_anchor_gets_chained_flavor() {
        let reg = registry();
        let overloads = overloads_for(&reg, "vkGetMemoryProperties");
        assert!(overloads.iter().any(|o| o.kind == OverloadKind::Chained));
    }

    #[test]
    fn zero_parameter_command_selects_no_overloads() {
        let reg = registry();
        let cmd = crate::model::CommandData {
            return_type: "void".to_string(),
            ..Default::default()
        };
        let cls = classify(&cmd, &reg);
        let selection = select("vkNothing", &cmd, &cls, &reg).expect("not a shape miss");
        assert!(selection.overloads.is_empty());
    }

    #[test]
    fn unknown_shape_is_a_miss_not_an_error() {
        let reg = registry();
        // Fabricate a command returning four non-const pointers.
        let mut cmd = reg.commands["vkCreateBuffer"].clone();
        let extra = cmd.params[3].clone();
        cmd.params.push({
            let mut p = extra.clone();
            p.name = "pSecond".into();
            p
        });
        cmd.params.push({
            let mut p = extra.clone();
            p.name = "pThird".into();
            p
        });
        cmd.params.push({
            let mut p = extra;
            p.name = "pFourth".into();
            p
        });
        let cls = classify(&cmd, &reg);
        assert!(select("vkWeird", &cmd, &cls, &reg).is_none());
    }
}
