//! Registry model types — the bridge between XML ingestion and C++ emission.
//!
//! The model is XML-independent: every inter-entity reference is a name key
//! into the owning [`Registry`] map, which keeps the ownership graph acyclic
//! even though the domain relationships are not (handles name commands whose
//! parameters name handle types). After validation the registry is treated as
//! immutable; the emitter keeps its own scratch state.

use indexmap::{IndexMap, IndexSet};

use crate::names;

/// The prefix/type/postfix decomposition of a C declaration type.
///
/// `prefix` is one of `""`, `const`, `struct`, `const struct`, `typedef`;
/// `postfix` encodes pointer depth as space-separated stars, optionally with
/// a trailing `const`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInfo {
    pub prefix: String,
    pub ty: String,
    pub postfix: String,
}

impl TypeInfo {
    /// A plain value type: no pointer stars.
    pub fn is_value(&self) -> bool {
        self.postfix.is_empty()
    }

    pub fn is_pointer(&self) -> bool {
        self.postfix.ends_with('*')
    }

    pub fn is_const_pointer(&self) -> bool {
        self.is_pointer() && self.prefix.contains("const")
    }

    pub fn is_non_const_pointer(&self) -> bool {
        self.is_pointer() && !self.prefix.contains("const")
    }

    /// Pointer depth (`*` count) of the postfix.
    pub fn pointer_depth(&self) -> usize {
        self.postfix.chars().filter(|c| *c == '*').count()
    }

    /// The full C spelling, e.g. `const VkBufferCreateInfo *`.
    pub fn compose_c(&self) -> String {
        compose(&self.prefix, &self.ty, &self.postfix)
    }

    /// The C++ spelling with the `Vk` prefix stripped off known types.
    pub fn compose_cpp(&self) -> String {
        let ty = if self.ty.starts_with("Vk") {
            names::cpp_type_name(&self.ty)
        } else {
            self.ty.clone()
        };
        compose(&self.prefix, &ty, &self.postfix)
    }
}

fn compose(prefix: &str, ty: &str, postfix: &str) -> String {
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

/// Declared name together with array and bitfield decorations.
#[derive(Debug, Clone, Default)]
pub struct NameData {
    pub name: String,
    /// One size expression per `[…]` group, literal or a constant name.
    pub array_sizes: Vec<String>,
    pub bit_count: Option<String>,
}

/// A command parameter.
#[derive(Debug, Clone)]
pub struct ParamData {
    pub type_info: TypeInfo,
    pub name: String,
    pub array_sizes: Vec<String>,
    /// Length expression: a sibling parameter name, `null-terminated`, a
    /// struct-member path `p->m`, or a latexmath expression (ignored).
    pub len: Option<String>,
    pub optional: bool,
    pub xml_line: usize,
}

/// A struct or union member.
#[derive(Debug, Clone)]
pub struct MemberData {
    pub type_info: TypeInfo,
    pub name: String,
    pub array_sizes: Vec<String>,
    pub bit_count: Option<String>,
    /// Length expressions, one per comma-separated `len` token.
    pub len: Vec<String>,
    /// Required enum values (`sType` members carry exactly one).
    pub values: Vec<String>,
    /// Name of the sibling member discriminating a union-typed member.
    pub selector: Option<String>,
    /// Discriminator value selecting this member of a union.
    pub selection: Option<String>,
    pub used_constant: Option<String>,
    pub no_auto_validity: bool,
    pub optional: Vec<bool>,
    pub xml_line: usize,
}

/// A single enum value. `single_bit` distinguishes `bitpos` encodings from
/// plain `value` encodings.
#[derive(Debug, Clone)]
pub struct EnumValueData {
    pub c_name: String,
    pub cpp_name: String,
    pub single_bit: bool,
    pub xml_line: usize,
}

/// An enumeration, including bitmask bit enums.
#[derive(Debug, Clone, Default)]
pub struct EnumData {
    pub values: Vec<EnumValueData>,
    /// alias c-name → (target c-name, cpp spelling).
    pub aliases: IndexMap<String, (String, String)>,
    pub is_bitmask: bool,
    pub alias: Option<String>,
    pub xml_line: usize,
}

impl EnumData {
    /// Add a value unless an existing value or alias already produces the
    /// same C++ spelling (aliases that only reorder the vendor tag are
    /// deduplicated this way).
    pub fn add_value(&mut self, c_name: &str, cpp_name: &str, single_bit: bool, xml_line: usize) {
        if self.values.iter().any(|v| v.cpp_name == cpp_name)
            || self.aliases.values().any(|(_, cpp)| cpp == cpp_name)
        {
            return;
        }
        self.values.push(EnumValueData {
            c_name: c_name.to_string(),
            cpp_name: cpp_name.to_string(),
            single_bit,
            xml_line,
        });
    }

    /// Add an alias entry unless it collapses to an existing cpp spelling.
    pub fn add_alias(&mut self, c_name: &str, target: &str, cpp_name: &str) {
        if self.values.iter().any(|v| v.cpp_name == cpp_name)
            || self.aliases.values().any(|(_, cpp)| cpp == cpp_name)
        {
            return;
        }
        self.aliases
            .insert(c_name.to_string(), (target.to_string(), cpp_name.to_string()));
    }

    /// Resolve an aliased c-name to the value it ultimately refers to.
    pub fn resolve_alias<'a>(&'a self, c_name: &'a str) -> Option<&'a EnumValueData> {
        let mut current = c_name;
        // Alias chains are short; the validator rejects cycles.
        for _ in 0..16 {
            if let Some(v) = self.values.iter().find(|v| v.c_name == current) {
                return Some(v);
            }
            match self.aliases.get(current) {
                Some((target, _)) => current = target,
                None => return None,
            }
        }
        None
    }
}

/// A `VkFlags`/`VkFlags64` typedef tied to a bit enum.
#[derive(Debug, Clone)]
pub struct BitmaskData {
    /// Name of the `FlagBits` enum backing this mask; empty when none is
    /// declared (the emitter synthesizes a placeholder).
    pub requirements: String,
    /// Underlying C typedef: `VkFlags` or `VkFlags64`.
    pub ty: String,
    pub alias: Option<String>,
    pub xml_line: usize,
}

/// A dispatchable or non-dispatchable handle type.
#[derive(Debug, Clone, Default)]
pub struct HandleData {
    pub parents: IndexSet<String>,
    pub obj_type_enum: String,
    /// Command that destroys/frees/releases this handle, if any.
    pub delete_command: String,
    /// Pool parameter name of the delete command (`vkFreeDescriptorSets`
    /// style pool-owned handles).
    pub delete_pool: String,
    /// Commands whose first parameter is this handle.
    pub commands: IndexSet<String>,
    pub children: IndexSet<String>,
    pub alias: Option<String>,
    /// Derived from the C define macro: `VK_DEFINE_HANDLE` is dispatchable,
    /// `VK_DEFINE_NON_DISPATCHABLE_HANDLE` is not.
    pub dispatchable: bool,
    pub xml_line: usize,
}

/// A structure or union.
#[derive(Debug, Clone, Default)]
pub struct StructureData {
    pub members: Vec<MemberData>,
    /// Structures this one may extend through a `pNext` chain.
    pub struct_extends: Vec<String>,
    pub aliases: IndexSet<String>,
    pub allow_duplicate: bool,
    pub is_union: bool,
    pub returned_only: bool,
    pub sub_struct: Option<String>,
    pub mutual_exclusive_lens: bool,
    pub xml_line: usize,
}

impl StructureData {
    /// The `VkStructureType` value of the `sType` member, if present.
    pub fn stype_value(&self) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.name == "sType")
            .and_then(|m| m.values.first())
            .map(String::as_str)
    }
}

/// Where a command alias came from.
#[derive(Debug, Clone, Default)]
pub struct CommandAliasData {
    pub feature: String,
    pub extensions: IndexSet<String>,
    pub xml_line: usize,
}

/// A registry command.
#[derive(Debug, Clone, Default)]
pub struct CommandData {
    pub return_type: String,
    pub success_codes: Vec<String>,
    pub error_codes: Vec<String>,
    pub params: Vec<ParamData>,
    /// Owning handle name, or empty for free functions.
    pub handle: String,
    /// Core version that introduced the command (`VK_VERSION_1_1`), or empty.
    pub feature: String,
    pub extensions: IndexSet<String>,
    pub aliases: IndexMap<String, CommandAliasData>,
    pub xml_line: usize,
}

impl CommandData {
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

/// A window-system platform with its compile guard macro.
#[derive(Debug, Clone)]
pub struct PlatformData {
    pub protect: String,
    pub xml_line: usize,
}

/// An extension and its lifecycle metadata.
#[derive(Debug, Clone, Default)]
pub struct ExtensionData {
    pub number: String,
    pub platform: String,
    pub promoted_to: String,
    pub deprecated_by: String,
    pub obsoleted_by: String,
    /// Extensions/features this one depends on.
    pub depends: Vec<String>,
    /// Types, commands and enum values introduced by this extension, kept so
    /// disabled extensions can be unwound in a second pass.
    pub types: IndexSet<String>,
    pub commands: IndexSet<String>,
    /// (enum name, value c-name) pairs this extension added.
    pub enum_values: Vec<(String, String)>,
    pub xml_line: usize,
}

/// A core feature level (`VK_VERSION_1_0`, ...).
#[derive(Debug, Clone)]
pub struct FeatureData {
    pub number: String,
    pub xml_line: usize,
}

/// A `typedef` of a C scalar (`VkBool32`, `VkDeviceSize`, ...).
#[derive(Debug, Clone)]
pub struct BaseTypeData {
    pub type_info: TypeInfo,
    pub xml_line: usize,
}

/// A function pointer typedef.
#[derive(Debug, Clone, Default)]
pub struct FuncPointerData {
    pub requirements: String,
    pub xml_line: usize,
}

/// What category a registry name belongs to. Populated for every declared
/// name so references can be resolved in one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    BaseType,
    Bitmask,
    Define,
    Enum,
    ExternalType,
    FuncPointer,
    Handle,
    Include,
    Struct,
    Union,
}

/// The fully ingested registry. Owns every sub-object; all cross-references
/// are by name.
#[derive(Debug, Default)]
pub struct Registry {
    pub base_types: IndexMap<String, BaseTypeData>,
    pub bitmasks: IndexMap<String, BitmaskData>,
    pub constants: IndexMap<String, String>,
    pub commands: IndexMap<String, CommandData>,
    pub defines: IndexSet<String>,
    pub enums: IndexMap<String, EnumData>,
    pub extensions: IndexMap<String, ExtensionData>,
    pub external_types: IndexSet<String>,
    pub features: IndexMap<String, FeatureData>,
    pub func_pointers: IndexMap<String, FuncPointerData>,
    pub handles: IndexMap<String, HandleData>,
    pub includes: IndexSet<String>,
    pub platforms: IndexMap<String, PlatformData>,
    pub structs: IndexMap<String, StructureData>,
    pub tags: Vec<String>,
    /// Every declared type name and its category.
    pub types: IndexMap<String, TypeCategory>,

    pub license_header: String,
    /// `VK_HEADER_VERSION` as parsed from the version define.
    pub version: String,
    /// The expression of the 64-bit type-safety check define.
    pub typesafe_check: String,
}

impl Registry {
    pub fn is_handle(&self, ty: &str) -> bool {
        self.handles.contains_key(ty)
    }

    pub fn is_struct_or_union(&self, ty: &str) -> bool {
        self.structs.contains_key(ty)
    }

    /// Look up a struct, following one level of type alias.
    pub fn struct_by_name(&self, ty: &str) -> Option<&StructureData> {
        self.structs.get(ty).or_else(|| {
            self.structs
                .values()
                .find(|s| s.aliases.contains(ty))
        })
    }

    /// True when some other struct can extend `ty` through its pNext chain.
    pub fn is_chain_anchor(&self, ty: &str) -> bool {
        self.structs
            .values()
            .any(|s| s.struct_extends.iter().any(|t| t == ty))
    }

    /// The `protect` macro guarding `extension`, if its platform has one.
    pub fn protect_for_extension(&self, extension: &str) -> Option<&str> {
        let ext = self.extensions.get(extension)?;
        let platform = self.platforms.get(&ext.platform)?;
        Some(&platform.protect)
    }

    /// The guard macro for a command, derived from the platforms of the
    /// extensions that introduced it. The validator enforces at most one.
    pub fn protect_for_command(&self, cmd: &CommandData) -> Option<&str> {
        cmd.extensions
            .iter()
            .find_map(|e| self.protect_for_extension(e))
    }

    /// Record a declared name, failing on redeclaration.
    pub fn register_type(
        &mut self,
        name: &str,
        category: TypeCategory,
        line: usize,
    ) -> anyhow::Result<()> {
        if let Some(existing) = self.types.insert(name.to_string(), category) {
            anyhow::bail!(
                "Spec error on line {line}: type `{name}` already declared as {existing:?}"
            );
        }
        Ok(())
    }
}
