//! XML ingestion — registry document → [`Registry`] model.
//!
//! Recursive descent keyed on element name. Every handler validates the
//! element's attribute set (missing required attributes are fatal, unknown
//! attributes and out-of-range values warn) and its child elements (unknown
//! children are fatal) before reading content in document order.
//!
//! Diagnostics carry the XML line of the offending node:
//! `Spec error on line N: message`.

use anyhow::{bail, Result};
use roxmltree::{Document, Node, NodeType};
use tracing::{debug, info, warn};

use crate::model::*;
use crate::names;

/// C scalar types the registry may reference without declaring.
pub const C_PRIMITIVES: &[&str] = &[
    "void", "char", "float", "double", "int", "int8_t", "int16_t", "int32_t", "int64_t",
    "uint8_t", "uint16_t", "uint32_t", "uint64_t", "size_t",
];

/// Platform scraps the C API passes as non-const pointers purely by
/// convention; they are never treated as output parameters.
pub const SPECIAL_POINTER_TYPES: &[&str] =
    &["Display", "IDirectFB", "wl_display", "xcb_connection_t"];

/// Parse the registry XML into a fully populated model.
pub fn parse_registry(xml: &str) -> Result<Registry> {
    let doc = Document::parse(xml).map_err(|e| anyhow::anyhow!("malformed XML: {e}"))?;
    let root = doc.root_element();
    if root.tag_name().name() != "registry" {
        bail!(
            "Spec error on line {}: expected root element <registry>, got <{}>",
            line_of(&doc, root),
            root.tag_name().name()
        );
    }

    let mut parser = Parser::new(&doc);
    parser.read_registry(root)?;
    parser.link_handles();
    parser.apply_command_aliases()?;
    parser.determine_sub_structs();
    parser.remove_disabled_extensions()?;

    let reg = parser.registry;
    info!(
        enums = reg.enums.len(),
        bitmasks = reg.bitmasks.len(),
        handles = reg.handles.len().saturating_sub(1),
        structs = reg.structs.len(),
        commands = reg.commands.len(),
        extensions = reg.extensions.len(),
        "registry ingestion complete"
    );
    Ok(reg)
}

fn line_of(doc: &Document, node: Node) -> usize {
    doc.text_pos_at(node.range().start).row as usize
}

struct Parser<'a, 'input> {
    doc: &'a Document<'input>,
    registry: Registry,
    /// Extensions declared `supported="disabled"`, unwound in a second pass.
    disabled_extensions: Vec<String>,
    /// `<command name=… alias=…>` records, applied once all commands exist.
    command_aliases: Vec<(String, String, usize)>,
    /// (alias name, extension name) tags for aliased commands, applied with
    /// the alias table.
    alias_extension_tags: Vec<(String, String)>,
}

impl<'a, 'input> Parser<'a, 'input> {
    fn new(doc: &'a Document<'input>) -> Self {
        let mut registry = Registry::default();
        // The empty-name handle owns free functions (commands whose first
        // parameter is not a handle).
        registry.handles.insert(String::new(), HandleData::default());
        Parser {
            doc,
            registry,
            disabled_extensions: Vec::new(),
            command_aliases: Vec::new(),
            alias_extension_tags: Vec::new(),
        }
    }

    fn line(&self, node: Node) -> usize {
        line_of(self.doc, node)
    }

    // -----------------------------------------------------------------------
    // Schema checks
    // -----------------------------------------------------------------------

    /// Validate an element's attributes. `required`/`optional` pair each
    /// attribute name with its allowed values (empty slice = any value).
    /// Missing required attributes fail; unknown attributes and unexpected
    /// values warn.
    fn check_attributes(
        &self,
        node: Node,
        required: &[(&str, &[&str])],
        optional: &[(&str, &[&str])],
    ) -> Result<()> {
        let line = self.line(node);
        for (name, allowed) in required {
            match node.attribute(*name) {
                None => bail!(
                    "Spec error on line {line}: missing required attribute `{name}` on <{}>",
                    node.tag_name().name()
                ),
                Some(value) => check_attribute_value(line, name, value, allowed),
            }
        }
        for attr in node.attributes() {
            let name = attr.name();
            if required.iter().any(|(n, _)| *n == name) {
                continue;
            }
            match optional.iter().find(|(n, _)| *n == name) {
                Some((_, allowed)) => check_attribute_value(line, name, attr.value(), allowed),
                None => warn!(
                    line,
                    element = node.tag_name().name(),
                    attribute = name,
                    "unknown attribute"
                ),
            }
        }
        Ok(())
    }

    /// Validate child-element names against `required` (must appear at least
    /// once) and `optional`. Unknown children are fatal.
    fn check_elements(&self, node: Node, required: &[&str], optional: &[&str]) -> Result<()> {
        let line = self.line(node);
        for child in node.children().filter(Node::is_element) {
            let name = child.tag_name().name();
            if !required.contains(&name) && !optional.contains(&name) {
                bail!(
                    "Spec error on line {}: unexpected element <{name}> in <{}>",
                    self.line(child),
                    node.tag_name().name()
                );
            }
        }
        for name in required {
            if !node
                .children()
                .any(|c| c.is_element() && c.tag_name().name() == *name)
            {
                bail!(
                    "Spec error on line {line}: missing required element <{name}> in <{}>",
                    node.tag_name().name()
                );
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Top level
    // -----------------------------------------------------------------------

    fn read_registry(&mut self, node: Node) -> Result<()> {
        self.check_elements(
            node,
            &["types", "enums", "commands"],
            &[
                "comment",
                "platforms",
                "tags",
                "feature",
                "extensions",
                "formats",
                "spirvcapabilities",
                "spirvextensions",
                "sync",
                "videocodecs",
            ],
        )?;
        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "comment" => self.read_comment(child),
                "platforms" => self.read_platforms(child)?,
                "tags" => self.read_tags(child)?,
                "types" => self.read_types(child)?,
                "enums" => self.read_enums(child)?,
                "commands" => self.read_commands(child)?,
                "feature" => self.read_feature(child)?,
                "extensions" => self.read_extensions(child)?,
                // SPIR-V and format metadata do not surface in the header.
                "formats" | "spirvcapabilities" | "spirvextensions" | "sync" | "videocodecs" => {}
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    fn read_comment(&mut self, node: Node) {
        if let Some(text) = node.text() {
            if text.trim_start().starts_with("Copyright") && self.registry.license_header.is_empty()
            {
                let cleaned: Vec<&str> = text.lines().map(str::trim_end).collect();
                self.registry.license_header = cleaned.join("\n").trim().to_string();
                debug!(lines = cleaned.len(), "captured license header");
            }
        }
    }

    fn read_platforms(&mut self, node: Node) -> Result<()> {
        self.check_elements(node, &[], &["platform"])?;
        for child in node.children().filter(Node::is_element) {
            self.check_attributes(
                child,
                &[("name", &[]), ("protect", &[])],
                &[("comment", &[])],
            )?;
            let name = child.attribute("name").unwrap();
            let protect = child.attribute("protect").unwrap();
            let line = self.line(child);
            if self
                .registry
                .platforms
                .insert(
                    name.to_string(),
                    PlatformData {
                        protect: protect.to_string(),
                        xml_line: line,
                    },
                )
                .is_some()
            {
                bail!("Spec error on line {line}: platform `{name}` already declared");
            }
        }
        Ok(())
    }

    fn read_tags(&mut self, node: Node) -> Result<()> {
        self.check_elements(node, &[], &["tag"])?;
        for child in node.children().filter(Node::is_element) {
            self.check_attributes(
                child,
                &[("name", &[]), ("author", &[]), ("contact", &[])],
                &[],
            )?;
            let name = child.attribute("name").unwrap();
            if self.registry.tags.iter().any(|t| t == name) {
                bail!(
                    "Spec error on line {}: tag `{name}` already declared",
                    self.line(child)
                );
            }
            self.registry.tags.push(name.to_string());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // <types> — dispatch on the category attribute
    // -----------------------------------------------------------------------

    fn read_types(&mut self, node: Node) -> Result<()> {
        self.check_elements(node, &[], &["comment", "type"])?;
        for child in node.children().filter(Node::is_element) {
            if child.tag_name().name() == "comment" {
                continue;
            }
            if !api_supported(child) {
                continue;
            }
            match child.attribute("category") {
                None => self.read_type_external(child)?,
                Some("basetype") => self.read_type_basetype(child)?,
                Some("bitmask") => self.read_type_bitmask(child)?,
                Some("define") => self.read_type_define(child)?,
                Some("enum") => self.read_type_enum(child)?,
                Some("funcpointer") => self.read_type_funcpointer(child)?,
                Some("handle") => self.read_type_handle(child)?,
                Some("include") => self.read_type_include(child)?,
                Some("struct") => self.read_type_struct(child, false)?,
                Some("union") => self.read_type_struct(child, true)?,
                Some(other) => bail!(
                    "Spec error on line {}: unknown type category `{other}`",
                    self.line(child)
                ),
            }
        }
        Ok(())
    }

    /// A `<type>` without a category: either a `requires`-based reference to
    /// a platform header type or a C primitive.
    fn read_type_external(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[("name", &[])],
            &[("requires", &[]), ("api", &[]), ("comment", &[])],
        )?;
        let name = node.attribute("name").unwrap();
        let line = self.line(node);
        self.registry
            .register_type(name, TypeCategory::ExternalType, line)?;
        self.registry.external_types.insert(name.to_string());
        Ok(())
    }

    fn read_type_basetype(&mut self, node: Node) -> Result<()> {
        self.check_attributes(node, &[("category", &["basetype"])], &[("api", &[])])?;
        let line = self.line(node);
        let (type_info, name_data) = self.read_type_and_name(node)?;
        if name_data.name.is_empty() {
            bail!("Spec error on line {line}: basetype without a <name>");
        }
        self.registry
            .register_type(&name_data.name, TypeCategory::BaseType, line)?;
        self.registry.base_types.insert(
            name_data.name,
            BaseTypeData {
                type_info,
                xml_line: line,
            },
        );
        Ok(())
    }

    fn read_type_bitmask(&mut self, node: Node) -> Result<()> {
        let line = self.line(node);
        if let Some(alias) = node.attribute("alias") {
            self.check_attributes(
                node,
                &[("category", &["bitmask"]), ("name", &[]), ("alias", &[])],
                &[("api", &[])],
            )?;
            let name = node.attribute("name").unwrap();
            self.registry
                .register_type(name, TypeCategory::Bitmask, line)?;
            self.registry.bitmasks.insert(
                name.to_string(),
                BitmaskData {
                    requirements: String::new(),
                    ty: String::new(),
                    alias: Some(alias.to_string()),
                    xml_line: line,
                },
            );
            return Ok(());
        }

        self.check_attributes(
            node,
            &[("category", &["bitmask"])],
            &[("requires", &[]), ("bitvalues", &[]), ("api", &[])],
        )?;
        let (type_info, name_data) = self.read_type_and_name(node)?;
        if !matches!(type_info.ty.as_str(), "VkFlags" | "VkFlags64") {
            bail!(
                "Spec error on line {line}: bitmask `{}` typedefs `{}`, expected VkFlags or VkFlags64",
                name_data.name,
                type_info.ty
            );
        }
        let requirements = node
            .attribute("requires")
            .or_else(|| node.attribute("bitvalues"))
            .unwrap_or("")
            .to_string();
        self.registry
            .register_type(&name_data.name, TypeCategory::Bitmask, line)?;
        self.registry.bitmasks.insert(
            name_data.name,
            BitmaskData {
                requirements,
                ty: type_info.ty,
                alias: None,
                xml_line: line,
            },
        );
        Ok(())
    }

    fn read_type_define(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[("category", &["define"])],
            &[
                ("name", &[]),
                ("requires", &[]),
                ("api", &[]),
                ("deprecated", &[]),
                ("comment", &[]),
            ],
        )?;
        let line = self.line(node);
        let name = match node.attribute("name") {
            Some(n) => n.to_string(),
            None => child_element_text(node, "name").unwrap_or_default(),
        };
        if name.is_empty() {
            bail!("Spec error on line {line}: define without a name");
        }

        let full_text = collect_text(node);
        if name == "VK_HEADER_VERSION" {
            self.registry.version = full_text
                .split_whitespace()
                .last()
                .unwrap_or("")
                .to_string();
        }
        if full_text.contains("VK_USE_64_BIT_PTR_DEFINES") {
            if let Some(check) = full_text.lines().find(|l| l.trim_start().starts_with("#if")) {
                self.registry.typesafe_check = check.trim().to_string();
            }
        }

        self.registry
            .register_type(&name, TypeCategory::Define, line)?;
        self.registry.defines.insert(name);
        Ok(())
    }

    /// Forward declaration of an enum type; values arrive via `<enums>`.
    fn read_type_enum(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[("category", &["enum"]), ("name", &[])],
            &[("alias", &[]), ("api", &[]), ("deprecated", &[])],
        )?;
        let name = node.attribute("name").unwrap();
        let line = self.line(node);
        self.registry.register_type(name, TypeCategory::Enum, line)?;
        let mut data = EnumData {
            is_bitmask: name.contains("FlagBits"),
            alias: node.attribute("alias").map(str::to_string),
            xml_line: line,
            ..EnumData::default()
        };
        if data.alias.is_some() {
            data.is_bitmask = false; // resolved through the target
        }
        self.registry.enums.insert(name.to_string(), data);
        Ok(())
    }

    fn read_type_funcpointer(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[("category", &["funcpointer"])],
            &[("requires", &[]), ("api", &[])],
        )?;
        let line = self.line(node);
        let name = child_element_text(node, "name").unwrap_or_default();
        if name.is_empty() {
            bail!("Spec error on line {line}: funcpointer without a <name>");
        }
        self.registry
            .register_type(&name, TypeCategory::FuncPointer, line)?;
        self.registry.func_pointers.insert(
            name,
            FuncPointerData {
                requirements: node.attribute("requires").unwrap_or("").to_string(),
                xml_line: line,
            },
        );
        Ok(())
    }

    fn read_type_handle(&mut self, node: Node) -> Result<()> {
        let line = self.line(node);
        if let Some(alias) = node.attribute("alias") {
            self.check_attributes(
                node,
                &[("category", &["handle"]), ("name", &[]), ("alias", &[])],
                &[],
            )?;
            let name = node.attribute("name").unwrap();
            self.registry
                .register_type(name, TypeCategory::Handle, line)?;
            self.registry.handles.insert(
                name.to_string(),
                HandleData {
                    alias: Some(alias.to_string()),
                    xml_line: line,
                    ..HandleData::default()
                },
            );
            return Ok(());
        }

        self.check_attributes(
            node,
            &[("category", &["handle"])],
            &[("parent", &[]), ("objtypeenum", &[]), ("api", &[])],
        )?;
        let (type_info, name_data) = self.read_type_and_name(node)?;
        let dispatchable = match type_info.ty.as_str() {
            "VK_DEFINE_HANDLE" => true,
            "VK_DEFINE_NON_DISPATCHABLE_HANDLE" => false,
            other => bail!(
                "Spec error on line {line}: handle `{}` uses unknown define `{other}`",
                name_data.name
            ),
        };
        let parents: indexmap::IndexSet<String> = node
            .attribute("parent")
            .map(|p| p.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        self.registry
            .register_type(&name_data.name, TypeCategory::Handle, line)?;
        self.registry.handles.insert(
            name_data.name,
            HandleData {
                parents,
                obj_type_enum: node.attribute("objtypeenum").unwrap_or("").to_string(),
                dispatchable,
                xml_line: line,
                ..HandleData::default()
            },
        );
        Ok(())
    }

    fn read_type_include(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[("category", &["include"]), ("name", &[])],
            &[],
        )?;
        let name = node.attribute("name").unwrap();
        let line = self.line(node);
        self.registry
            .register_type(name, TypeCategory::Include, line)?;
        self.registry.includes.insert(name.to_string());
        Ok(())
    }

    fn read_type_struct(&mut self, node: Node, is_union: bool) -> Result<()> {
        let line = self.line(node);
        let category: &[&str] = if is_union { &["union"] } else { &["struct"] };
        if let Some(alias) = node.attribute("alias") {
            self.check_attributes(
                node,
                &[("category", category), ("name", &[]), ("alias", &[])],
                &[("api", &[])],
            )?;
            let name = node.attribute("name").unwrap();
            let target = self.registry.structs.get_mut(alias).ok_or_else(|| {
                anyhow::anyhow!(
                    "Spec error on line {line}: struct alias `{name}` targets unknown `{alias}`"
                )
            })?;
            target.aliases.insert(name.to_string());
            let cat = if is_union {
                TypeCategory::Union
            } else {
                TypeCategory::Struct
            };
            self.registry.register_type(name, cat, line)?;
            return Ok(());
        }

        self.check_attributes(
            node,
            &[("category", category), ("name", &[])],
            &[
                ("structextends", &[]),
                ("returnedonly", &["true", "false"]),
                ("allowduplicate", &["true", "false"]),
                ("api", &[]),
                ("comment", &[]),
            ],
        )?;
        self.check_elements(node, &[], &["member", "comment"])?;
        let name = node.attribute("name").unwrap();

        let mut members = Vec::new();
        for child in node.children().filter(Node::is_element) {
            if child.tag_name().name() != "member" || !api_supported(child) {
                continue;
            }
            members.push(self.read_member(child)?);
        }
        let mutual_exclusive_lens = members.iter().any(|m| {
            m.len
                .iter()
                .filter(|l| !l.starts_with("latexmath") && *l != "null-terminated")
                .count()
                > 1
        });

        let cat = if is_union {
            TypeCategory::Union
        } else {
            TypeCategory::Struct
        };
        self.registry.register_type(name, cat, line)?;
        self.registry.structs.insert(
            name.to_string(),
            StructureData {
                members,
                struct_extends: node
                    .attribute("structextends")
                    .map(|s| s.split(',').map(str::to_string).collect())
                    .unwrap_or_default(),
                allow_duplicate: node.attribute("allowduplicate") == Some("true"),
                is_union,
                returned_only: node.attribute("returnedonly") == Some("true"),
                mutual_exclusive_lens,
                xml_line: line,
                ..StructureData::default()
            },
        );
        Ok(())
    }

    fn read_member(&mut self, node: Node) -> Result<MemberData> {
        self.check_attributes(
            node,
            &[],
            &[
                ("len", &[]),
                ("altlen", &[]),
                ("optional", &[]),
                ("selector", &[]),
                ("selection", &[]),
                ("noautovalidity", &["true", "false"]),
                ("values", &[]),
                ("limittype", &[]),
                ("objecttype", &[]),
                ("externsync", &[]),
                ("api", &[]),
                ("deprecated", &[]),
                ("featurelink", &[]),
            ],
        )?;
        let line = self.line(node);
        let (type_info, name_data) = self.read_type_and_name(node)?;
        if name_data.name.is_empty() {
            bail!("Spec error on line {line}: member without a <name>");
        }
        let used_constant = name_data
            .array_sizes
            .iter()
            .find(|s| s.starts_with("VK_"))
            .cloned();
        Ok(MemberData {
            type_info,
            name: name_data.name,
            array_sizes: name_data.array_sizes,
            bit_count: name_data.bit_count,
            len: split_list(node.attribute("len")),
            values: split_list(node.attribute("values")),
            selector: node.attribute("selector").map(str::to_string),
            selection: node.attribute("selection").map(str::to_string),
            used_constant,
            no_auto_validity: node.attribute("noautovalidity") == Some("true"),
            optional: split_list(node.attribute("optional"))
                .iter()
                .map(|v| v == "true")
                .collect(),
            xml_line: line,
        })
    }

    // -----------------------------------------------------------------------
    // <enums> blocks
    // -----------------------------------------------------------------------

    fn read_enums(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[("name", &[])],
            &[
                ("type", &["enum", "bitmask", "constants"]),
                ("bitwidth", &["64"]),
                ("start", &[]),
                ("end", &[]),
                ("vendor", &[]),
                ("comment", &[]),
            ],
        )?;
        self.check_elements(node, &[], &["enum", "comment", "unused"])?;
        let name = node.attribute("name").unwrap();
        let ty = node.attribute("type").unwrap_or("constants");

        if ty == "constants" {
            return self.read_constants(node);
        }

        let line = self.line(node);
        let is_bitmask = ty == "bitmask";
        let prefix = names::enum_value_prefix(name, is_bitmask);
        let tags = self.registry.tags.clone();
        let enum_data = match self.registry.enums.get_mut(name) {
            Some(data) => data,
            None => bail!(
                "Spec error on line {line}: enum block `{name}` has no forward declaration in <types>"
            ),
        };
        enum_data.is_bitmask = is_bitmask;

        for child in node.children().filter(Node::is_element) {
            if child.tag_name().name() != "enum" || !api_supported(child) {
                continue;
            }
            let value_line = line_of(self.doc, child);
            let c_name = child
                .attribute("name")
                .ok_or_else(|| anyhow::anyhow!("Spec error on line {value_line}: <enum> without name"))?;
            let cpp_name = names::create_enum_value_name(c_name, &prefix, is_bitmask, &tags);
            if let Some(alias) = child.attribute("alias") {
                enum_data.add_alias(c_name, alias, &cpp_name);
            } else if child.attribute("bitpos").is_some() {
                enum_data.add_value(c_name, &cpp_name, true, value_line);
            } else if child.attribute("value").is_some() {
                enum_data.add_value(c_name, &cpp_name, false, value_line);
            } else {
                bail!(
                    "Spec error on line {value_line}: enum value `{c_name}` has neither value, bitpos nor alias"
                );
            }
        }
        Ok(())
    }

    fn read_constants(&mut self, node: Node) -> Result<()> {
        for child in node.children().filter(Node::is_element) {
            if child.tag_name().name() != "enum" || !api_supported(child) {
                continue;
            }
            let line = line_of(self.doc, child);
            let name = child
                .attribute("name")
                .ok_or_else(|| anyhow::anyhow!("Spec error on line {line}: constant without name"))?;
            let value = match (child.attribute("value"), child.attribute("alias")) {
                (Some(v), _) => v.to_string(),
                (None, Some(alias)) => match self.registry.constants.get(alias) {
                    Some(v) => v.clone(),
                    None => bail!(
                        "Spec error on line {line}: constant `{name}` aliases unknown `{alias}`"
                    ),
                },
                (None, None) => bail!(
                    "Spec error on line {line}: constant `{name}` has neither value nor alias"
                ),
            };
            self.registry.constants.insert(name.to_string(), value);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // <commands>
    // -----------------------------------------------------------------------

    fn read_commands(&mut self, node: Node) -> Result<()> {
        self.check_elements(node, &[], &["command", "comment"])?;
        for child in node.children().filter(Node::is_element) {
            if child.tag_name().name() != "command" || !api_supported(child) {
                continue;
            }
            if let Some(alias) = child.attribute("alias") {
                let line = self.line(child);
                let name = child.attribute("name").ok_or_else(|| {
                    anyhow::anyhow!("Spec error on line {line}: command alias without name")
                })?;
                self.command_aliases
                    .push((name.to_string(), alias.to_string(), line));
                continue;
            }
            self.read_command(child)?;
        }
        Ok(())
    }

    fn read_command(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[],
            &[
                ("successcodes", &[]),
                ("errorcodes", &[]),
                ("queues", &[]),
                ("renderpass", &[]),
                ("cmdbufferlevel", &[]),
                ("tasks", &[]),
                ("comment", &[]),
                ("api", &[]),
                ("export", &[]),
                ("conditionalrendering", &[]),
            ],
        )?;
        self.check_elements(
            node,
            &["proto"],
            &["param", "implicitexternsyncparams", "description"],
        )?;
        let line = self.line(node);

        let proto = node
            .children()
            .find(|c| c.is_element() && c.tag_name().name() == "proto")
            .unwrap();
        let (return_info, name_data) = self.read_type_and_name(proto)?;
        let name = name_data.name;
        if name.is_empty() {
            bail!("Spec error on line {line}: command without a <name>");
        }

        let mut params = Vec::new();
        for child in node.children().filter(Node::is_element) {
            if child.tag_name().name() != "param" || !api_supported(child) {
                continue;
            }
            params.push(self.read_param(child)?);
        }

        let handle = params
            .first()
            .filter(|p| self.registry.is_handle(&p.type_info.ty))
            .map(|p| p.type_info.ty.clone())
            .unwrap_or_default();

        let command = CommandData {
            return_type: return_info.ty,
            success_codes: split_list(node.attribute("successcodes")),
            error_codes: split_list(node.attribute("errorcodes")),
            params,
            handle: handle.clone(),
            xml_line: line,
            ..CommandData::default()
        };

        self.register_deleter(&name, &command);
        self.registry
            .handles
            .get_mut(&handle)
            .expect("owning handle exists")
            .commands
            .insert(name.clone());
        if self.registry.commands.insert(name.clone(), command).is_some() {
            bail!("Spec error on line {line}: command `{name}` already declared");
        }
        debug!(name = %name, line, "read command");
        Ok(())
    }

    fn read_param(&mut self, node: Node) -> Result<ParamData> {
        self.check_attributes(
            node,
            &[],
            &[
                ("len", &[]),
                ("altlen", &[]),
                ("optional", &[]),
                ("externsync", &[]),
                ("noautovalidity", &["true", "false"]),
                ("objecttype", &[]),
                ("validstructs", &[]),
                ("stride", &[]),
                ("api", &[]),
            ],
        )?;
        let line = self.line(node);
        let (type_info, name_data) = self.read_type_and_name(node)?;
        if name_data.name.is_empty() {
            bail!("Spec error on line {line}: parameter without a <name>");
        }
        Ok(ParamData {
            type_info,
            name: name_data.name,
            array_sizes: name_data.array_sizes,
            len: node.attribute("len").map(str::to_string),
            optional: split_list(node.attribute("optional"))
                .first()
                .map(|v| v == "true")
                .unwrap_or(false),
            xml_line: line,
        })
    }

    /// Destroy/free/release commands register themselves as the deleter of
    /// the last handle-typed parameter. A command with a single handle
    /// parameter destroys that handle itself (`vkDestroyInstance`); with
    /// three, the middle one is the pool the handles came from
    /// (`vkFreeDescriptorSets`).
    fn register_deleter(&mut self, name: &str, command: &CommandData) {
        if !(name.starts_with("vkDestroy")
            || name.starts_with("vkFree")
            || name.starts_with("vkRelease"))
        {
            return;
        }
        let handle_params: Vec<&ParamData> = command
            .params
            .iter()
            .filter(|p| self.registry.is_handle(&p.type_info.ty))
            .collect();
        let Some(deleted) = handle_params.last() else {
            return;
        };
        let deleted_type = deleted.type_info.ty.clone();
        let pool = if handle_params.len() == 3 {
            handle_params[1].name.clone()
        } else {
            String::new()
        };
        if let Some(data) = self.registry.handles.get_mut(&deleted_type) {
            data.delete_command = name.to_string();
            data.delete_pool = pool;
        }
    }

    // -----------------------------------------------------------------------
    // <feature> and <extensions>
    // -----------------------------------------------------------------------

    fn read_feature(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[("api", &[]), ("name", &[]), ("number", &[])],
            &[("comment", &[]), ("depends", &[])],
        )?;
        if !api_supported(node) {
            return Ok(());
        }
        self.check_elements(node, &[], &["require", "remove", "deprecate"])?;
        let name = node.attribute("name").unwrap().to_string();
        let line = self.line(node);
        self.registry.features.insert(
            name.clone(),
            FeatureData {
                number: node.attribute("number").unwrap().to_string(),
                xml_line: line,
            },
        );

        for require in node.children().filter(Node::is_element) {
            if require.tag_name().name() != "require" {
                continue;
            }
            for entry in require.children().filter(Node::is_element) {
                if !api_supported(entry) {
                    continue;
                }
                match entry.tag_name().name() {
                    "command" => {
                        let cmd_line = line_of(self.doc, entry);
                        let cmd_name = require_name(entry, cmd_line)?;
                        if let Some(cmd) = self.registry.commands.get_mut(&cmd_name) {
                            if cmd.feature.is_empty() {
                                cmd.feature = name.clone();
                            }
                        } else if let Some((_, target, _)) = self
                            .command_aliases
                            .iter()
                            .find(|(alias, _, _)| *alias == cmd_name)
                            .cloned()
                        {
                            // The alias table is applied later; tag the target.
                            if let Some(cmd) = self.registry.commands.get_mut(&target) {
                                if cmd.feature.is_empty() {
                                    cmd.feature = name.clone();
                                }
                            }
                        } else {
                            bail!(
                                "Spec error on line {cmd_line}: feature `{name}` requires unknown command `{cmd_name}`"
                            );
                        }
                    }
                    "enum" => {
                        self.read_require_enum(entry, true)?;
                    }
                    "type" | "comment" | "feature" => {}
                    other => bail!(
                        "Spec error on line {}: unexpected element <{other}> in feature require",
                        line_of(self.doc, entry)
                    ),
                }
            }
        }
        Ok(())
    }

    fn read_extensions(&mut self, node: Node) -> Result<()> {
        self.check_elements(node, &[], &["extension"])?;
        for child in node.children().filter(Node::is_element) {
            self.read_extension(child)?;
        }
        Ok(())
    }

    fn read_extension(&mut self, node: Node) -> Result<()> {
        self.check_attributes(
            node,
            &[("name", &[]), ("supported", &[])],
            &[
                ("number", &[]),
                ("type", &["instance", "device"]),
                ("author", &[]),
                ("contact", &[]),
                ("platform", &[]),
                ("requires", &[]),
                ("depends", &[]),
                ("promotedto", &[]),
                ("deprecatedby", &[]),
                ("obsoletedby", &[]),
                ("specialuse", &[]),
                ("provisional", &["true"]),
                ("ratified", &[]),
                ("sortorder", &[]),
                ("nofeatures", &[]),
                ("comment", &[]),
            ],
        )?;
        let name = node.attribute("name").unwrap().to_string();
        let line = self.line(node);
        let supported = node.attribute("supported").unwrap();
        let disabled = supported.split(',').any(|s| s == "disabled");
        if !disabled && !supported.split(',').any(|s| s == "vulkan") {
            // vulkansc-only extension.
            return Ok(());
        }

        let mut ext = ExtensionData {
            number: node.attribute("number").unwrap_or("").to_string(),
            platform: node.attribute("platform").unwrap_or("").to_string(),
            promoted_to: node.attribute("promotedto").unwrap_or("").to_string(),
            deprecated_by: node.attribute("deprecatedby").unwrap_or("").to_string(),
            obsoleted_by: node.attribute("obsoletedby").unwrap_or("").to_string(),
            depends: split_list(
                node.attribute("depends")
                    .or_else(|| node.attribute("requires")),
            ),
            xml_line: line,
            ..ExtensionData::default()
        };

        for require in node.children().filter(Node::is_element) {
            if require.tag_name().name() != "require" {
                continue;
            }
            for entry in require.children().filter(Node::is_element) {
                if !api_supported(entry) {
                    continue;
                }
                let entry_line = line_of(self.doc, entry);
                match entry.tag_name().name() {
                    "type" => {
                        ext.types.insert(require_name(entry, entry_line)?);
                    }
                    "command" => {
                        let cmd_name = require_name(entry, entry_line)?;
                        ext.commands.insert(cmd_name.clone());
                        if disabled {
                            continue;
                        }
                        if let Some(cmd) = self.registry.commands.get_mut(&cmd_name) {
                            cmd.extensions.insert(name.clone());
                        } else if self
                            .command_aliases
                            .iter()
                            .any(|(alias, _, _)| *alias == cmd_name)
                        {
                            self.alias_extension_tags.push((cmd_name, name.clone()));
                        } else {
                            bail!(
                                "Spec error on line {entry_line}: extension `{name}` requires unknown command `{cmd_name}`"
                            );
                        }
                    }
                    "enum" => {
                        if let Some((enum_name, c_name)) =
                            self.read_require_enum(entry, !disabled)?
                        {
                            ext.enum_values.push((enum_name, c_name));
                        }
                    }
                    "comment" | "feature" => {}
                    other => bail!(
                        "Spec error on line {entry_line}: unexpected element <{other}> in extension require"
                    ),
                }
            }
        }

        if disabled {
            self.disabled_extensions.push(name.clone());
        }
        if self.registry.extensions.insert(name.clone(), ext).is_some() {
            bail!("Spec error on line {line}: extension `{name}` already declared");
        }
        Ok(())
    }

    /// A `<require><enum …>` entry: either a plain constant, a reference, or
    /// a value extending an existing enum. Returns the (enum, value) pair
    /// when a value was introduced, so extensions can be unwound.
    /// `record_constants` is false for disabled extensions, whose scoped
    /// constants must not leak into the model.
    fn read_require_enum(
        &mut self,
        node: Node,
        record_constants: bool,
    ) -> Result<Option<(String, String)>> {
        let line = self.line(node);
        let c_name = node
            .attribute("name")
            .ok_or_else(|| anyhow::anyhow!("Spec error on line {line}: <enum> without name"))?
            .to_string();

        let Some(extends) = node.attribute("extends") else {
            // Extension-scoped constant (SPEC_VERSION, EXTENSION_NAME, …).
            if let Some(value) = node.attribute("value") {
                if record_constants {
                    self.registry
                        .constants
                        .entry(c_name)
                        .or_insert_with(|| value.to_string());
                }
            }
            return Ok(None);
        };

        let tags = self.registry.tags.clone();
        let enum_data = match self.registry.enums.get_mut(extends) {
            Some(data) => data,
            None => bail!(
                "Spec error on line {line}: enum value `{c_name}` extends unknown enum `{extends}`"
            ),
        };
        let prefix = names::enum_value_prefix(extends, enum_data.is_bitmask);
        let cpp_name =
            names::create_enum_value_name(&c_name, &prefix, enum_data.is_bitmask, &tags);

        if let Some(alias) = node.attribute("alias") {
            enum_data.add_alias(&c_name, alias, &cpp_name);
        } else {
            let single_bit = node.attribute("bitpos").is_some();
            if node.attribute("offset").is_none()
                && node.attribute("bitpos").is_none()
                && node.attribute("value").is_none()
            {
                bail!(
                    "Spec error on line {line}: enum value `{c_name}` extends `{extends}` without offset, bitpos or value"
                );
            }
            enum_data.add_value(&c_name, &cpp_name, single_bit, line);
        }
        Ok(Some((extends.to_string(), c_name)))
    }

    // -----------------------------------------------------------------------
    // Post passes
    // -----------------------------------------------------------------------

    /// Fill each handle's `children` from the declared parent edges.
    fn link_handles(&mut self) {
        let edges: Vec<(String, String)> = self
            .registry
            .handles
            .iter()
            .flat_map(|(name, data)| {
                data.parents
                    .iter()
                    .map(move |p| (p.clone(), name.clone()))
            })
            .collect();
        for (parent, child) in edges {
            if let Some(data) = self.registry.handles.get_mut(&parent) {
                data.children.insert(child);
            }
        }
    }

    fn apply_command_aliases(&mut self) -> Result<()> {
        let tags = std::mem::take(&mut self.alias_extension_tags);
        for (alias, target, line) in std::mem::take(&mut self.command_aliases) {
            let Some(cmd) = self.registry.commands.get_mut(&target) else {
                bail!(
                    "Spec error on line {line}: command alias `{alias}` targets unknown `{target}`"
                );
            };
            let extensions = tags
                .iter()
                .filter(|(a, _)| *a == alias)
                .map(|(_, e)| e.clone())
                .collect();
            cmd.aliases.insert(
                alias,
                CommandAliasData {
                    feature: String::new(),
                    extensions,
                    xml_line: line,
                },
            );
        }
        Ok(())
    }

    /// A struct whose members form a strict prefix of another struct's
    /// members is recorded as that struct's sub-struct.
    fn determine_sub_structs(&mut self) {
        let names: Vec<String> = self.registry.structs.keys().cloned().collect();
        for name in &names {
            let candidate = {
                let outer = &self.registry.structs[name];
                if outer.is_union {
                    continue;
                }
                self.registry
                    .structs
                    .iter()
                    .find(|(inner_name, inner)| {
                        *inner_name != name
                            && !inner.is_union
                            && !inner.members.is_empty()
                            && inner.members.len() < outer.members.len()
                            && inner.members.iter().zip(&outer.members).all(|(a, b)| {
                                a.type_info == b.type_info && a.name == b.name
                            })
                    })
                    .map(|(inner_name, _)| inner_name.clone())
            };
            if let Some(sub) = candidate {
                self.registry.structs.get_mut(name).unwrap().sub_struct = Some(sub);
            }
        }
    }

    /// Unwind everything a `supported="disabled"` extension introduced. Runs
    /// after the whole document is read so declaration order does not matter.
    fn remove_disabled_extensions(&mut self) -> Result<()> {
        for ext_name in std::mem::take(&mut self.disabled_extensions) {
            let ext = self
                .registry
                .extensions
                .shift_remove(&ext_name)
                .expect("disabled extension was recorded");
            debug!(extension = %ext_name, types = ext.types.len(), commands = ext.commands.len(), "removing disabled extension");

            for (enum_name, value_name) in &ext.enum_values {
                let Some(enum_data) = self.registry.enums.get_mut(enum_name) else {
                    bail!(
                        "disabled extension `{ext_name}` extends unknown enum `{enum_name}`"
                    );
                };
                enum_data.values.retain(|v| v.c_name != *value_name);
                enum_data.aliases.shift_remove(value_name);
            }

            for cmd_name in &ext.commands {
                if self.registry.commands.shift_remove(cmd_name).is_none() {
                    bail!(
                        "disabled extension `{ext_name}` removes unknown command `{cmd_name}`"
                    );
                }
                for handle in self.registry.handles.values_mut() {
                    handle.commands.shift_remove(cmd_name);
                }
            }

            for type_name in &ext.types {
                let Some(category) = self.registry.types.shift_remove(type_name) else {
                    bail!(
                        "disabled extension `{ext_name}` removes unknown type `{type_name}`"
                    );
                };
                match category {
                    TypeCategory::Bitmask => {
                        self.registry.bitmasks.shift_remove(type_name);
                    }
                    TypeCategory::Enum => {
                        self.registry.enums.shift_remove(type_name);
                    }
                    TypeCategory::Handle => {
                        self.registry.handles.shift_remove(type_name);
                    }
                    TypeCategory::Struct | TypeCategory::Union => {
                        self.registry.structs.shift_remove(type_name);
                    }
                    TypeCategory::FuncPointer => {
                        self.registry.func_pointers.shift_remove(type_name);
                    }
                    TypeCategory::BaseType => {
                        self.registry.base_types.shift_remove(type_name);
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // The interleaved type/name grammar
    // -----------------------------------------------------------------------

    /// Read the mixed text/element content of `<proto>`, `<param>`,
    /// `<member>` and the typedef-style `<type>` categories: text before the
    /// `<type>` child is the type prefix, text after it the postfix (pointer
    /// stars normalized to space-separated), the `<name>` child gives the
    /// declared name, and trailing text encodes array sizes or a bitfield
    /// width.
    fn read_type_and_name(&self, node: Node) -> Result<(TypeInfo, NameData)> {
        let line = self.line(node);
        let mut info = TypeInfo::default();
        let mut name_data = NameData::default();
        let mut seen_type = false;
        let mut seen_name = false;
        let mut open_array = false;

        for child in node.children() {
            match child.node_type() {
                NodeType::Text => {
                    let text = child.text().unwrap_or("");
                    if !seen_type {
                        let prefix = text.trim();
                        if !prefix.is_empty() {
                            info.prefix = normalize_tokens(prefix);
                        }
                    } else if !seen_name {
                        let postfix = text.trim();
                        if !postfix.is_empty() {
                            if info.postfix.is_empty() {
                                info.postfix = normalize_tokens(postfix);
                            } else {
                                info.postfix =
                                    normalize_tokens(&format!("{} {}", info.postfix, postfix));
                            }
                        }
                    } else {
                        self.read_post_name_text(text, &mut name_data, &mut open_array, line)?;
                    }
                }
                NodeType::Element => match child.tag_name().name() {
                    "type" => {
                        info.ty = child.text().unwrap_or("").trim().to_string();
                        seen_type = true;
                    }
                    "name" => {
                        name_data.name = child.text().unwrap_or("").trim().to_string();
                        seen_name = true;
                    }
                    "enum" => {
                        // Array size given as a constant reference:
                        // `[<enum>VK_UUID_SIZE</enum>]`.
                        let constant = child.text().unwrap_or("").trim().to_string();
                        if !open_array {
                            bail!(
                                "Spec error on line {line}: <enum> array size outside of `[…]`"
                            );
                        }
                        name_data.array_sizes.push(constant);
                    }
                    "comment" => {}
                    other => bail!(
                        "Spec error on line {line}: unexpected element <{other}> in declaration"
                    ),
                },
                _ => {}
            }
        }
        Ok((info, name_data))
    }

    /// Text after `<name>`: `[2][4]` literal array sizes, `[` opening a
    /// constant-reference size, `:8` bitfield widths, or terminal
    /// punctuation.
    fn read_post_name_text(
        &self,
        text: &str,
        name_data: &mut NameData,
        open_array: &mut bool,
        line: usize,
    ) -> Result<()> {
        let mut rest = text.trim();
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                match after.find(']') {
                    Some(end) => {
                        let size = &after[..end];
                        if size.is_empty() {
                            bail!("Spec error on line {line}: empty array size");
                        }
                        name_data.array_sizes.push(size.to_string());
                        rest = &after[end + 1..];
                    }
                    None => {
                        // `[` … `<enum>CONST</enum>` … `]` split across nodes.
                        *open_array = true;
                        rest = after;
                    }
                }
            } else if let Some(after) = rest.strip_prefix(']') {
                *open_array = false;
                rest = after;
            } else if let Some(after) = rest.strip_prefix(':') {
                let width: String = after
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                if width.is_empty() {
                    bail!("Spec error on line {line}: empty bitfield width");
                }
                rest = &after[width.len()..];
                name_data.bit_count = Some(width);
            } else if rest.starts_with(';') || rest.starts_with(')') || rest.starts_with(',') {
                rest = &rest[1..];
            } else {
                bail!("Spec error on line {line}: unexpected declaration text `{rest}`");
            }
            rest = rest.trim_start();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

/// Values outside the declared set warn but do not fail; the registry grows
/// attribute values faster than this reader tracks them.
fn check_attribute_value(line: usize, attribute: &str, value: &str, allowed: &[&str]) {
    if allowed.is_empty() {
        return;
    }
    let ok = value.split(',').all(|v| allowed.contains(&v));
    if !ok {
        warn!(line, attribute, value, "unexpected attribute value");
    }
}

/// True when the node's `api` attribute (if any) includes `vulkan`.
fn api_supported(node: Node) -> bool {
    node.attribute("api")
        .map(|api| api.split(',').any(|a| a == "vulkan"))
        .unwrap_or(true)
}

fn split_list(attr: Option<&str>) -> Vec<String> {
    attr.map(|v| v.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

fn require_name(node: Node, line: usize) -> Result<String> {
    node.attribute("name")
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Spec error on line {line}: require entry without name"))
}

fn child_element_text(node: Node, tag: &str) -> Option<String> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == tag)
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
}

/// Collect all descendant text of a node, in document order.
fn collect_text(node: Node) -> String {
    let mut out = String::new();
    for d in node.descendants() {
        if d.node_type() == NodeType::Text {
            out.push_str(d.text().unwrap_or(""));
        }
    }
    out
}

/// Normalize a prefix/postfix token run: pointer stars become standalone
/// space-separated tokens (`const T**` postfix reads `* *`), all other
/// whitespace collapses to single spaces.
fn normalize_tokens(text: &str) -> String {
    let spaced = text.replace('*', " * ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Registry {
        parse_registry(xml).expect("registry should parse")
    }

    const MINIMAL: &str = r#"
<registry>
    <types>
        <type name="uint32_t"/>
    </types>
    <enums name="API Constants" type="constants">
        <enum value="256" name="VK_MAX_EXTENSION_NAME_SIZE"/>
    </enums>
    <commands/>
</registry>"#;

    #[test]
    fn minimal_registry_parses() {
        let reg = parse(MINIMAL);
        assert!(reg.external_types.contains("uint32_t"));
        assert_eq!(
            reg.constants.get("VK_MAX_EXTENSION_NAME_SIZE").unwrap(),
            "256"
        );
    }

    #[test]
    fn wrong_root_is_fatal() {
        let err = parse_registry("<notregistry/>").unwrap_err();
        assert!(err.to_string().contains("registry"), "{err}");
    }

    #[test]
    fn missing_required_attribute_is_fatal() {
        let xml = r#"
<registry>
    <platforms>
        <platform name="xlib"/>
    </platforms>
    <types><type name="uint32_t"/></types>
    <enums name="API Constants" type="constants"/>
    <commands/>
</registry>"#;
        let err = parse_registry(xml).unwrap_err();
        assert!(err.to_string().contains("protect"), "{err}");
        assert!(err.to_string().contains("Spec error on line"), "{err}");
    }

    #[test]
    fn handle_parsing_captures_dispatchability_and_parent() {
        let xml = r#"
<registry>
    <types>
        <type category="handle" parent="VkDevice" objtypeenum="VK_OBJECT_TYPE_BUFFER"><type>VK_DEFINE_NON_DISPATCHABLE_HANDLE</type>(<name>VkBuffer</name>)</type>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_DEVICE"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
    </types>
    <enums name="API Constants" type="constants"/>
    <commands/>
</registry>"#;
        let reg = parse(xml);
        let buffer = &reg.handles["VkBuffer"];
        assert!(!buffer.dispatchable);
        assert!(buffer.parents.contains("VkDevice"));
        assert_eq!(buffer.obj_type_enum, "VK_OBJECT_TYPE_BUFFER");
        let device = &reg.handles["VkDevice"];
        assert!(device.dispatchable);
        assert!(device.children.contains("VkBuffer"));
    }

    #[test]
    fn struct_member_grammar() {
        let xml = r#"
<registry>
    <types>
        <type name="uint32_t"/>
        <type name="char"/>
        <type category="struct" name="VkExtensionProperties" returnedonly="true">
            <member><type>char</type> <name>extensionName</name>[<enum>VK_MAX_EXTENSION_NAME_SIZE</enum>]</member>
            <member><type>uint32_t</type> <name>specVersion</name></member>
        </type>
        <type category="struct" name="VkThing">
            <member>const <type>char</type>* <name>pName</name></member>
            <member>const <type>char</type>* const* <name>ppNames</name></member>
            <member><type>uint32_t</type> <name>mask</name>:8</member>
            <member><type>uint32_t</type> <name>grid</name>[4][4]</member>
        </type>
    </types>
    <enums name="API Constants" type="constants">
        <enum value="256" name="VK_MAX_EXTENSION_NAME_SIZE"/>
    </enums>
    <commands/>
</registry>"#;
        let reg = parse(xml);
        let props = &reg.structs["VkExtensionProperties"];
        assert!(props.returned_only);
        assert_eq!(props.members[0].array_sizes, vec!["VK_MAX_EXTENSION_NAME_SIZE"]);
        assert_eq!(
            props.members[0].used_constant.as_deref(),
            Some("VK_MAX_EXTENSION_NAME_SIZE")
        );

        let thing = &reg.structs["VkThing"];
        assert_eq!(thing.members[0].type_info.prefix, "const");
        assert_eq!(thing.members[0].type_info.postfix, "*");
        assert_eq!(thing.members[1].type_info.postfix, "* const *");
        assert_eq!(thing.members[2].bit_count.as_deref(), Some("8"));
        assert_eq!(thing.members[3].array_sizes, vec!["4", "4"]);
    }

    #[test]
    fn enum_values_and_aliases_deduplicate() {
        let xml = r#"
<registry>
    <types>
        <type category="enum" name="VkImageType"/>
    </types>
    <enums name="VkImageType" type="enum">
        <enum value="0" name="VK_IMAGE_TYPE_1D"/>
        <enum value="1" name="VK_IMAGE_TYPE_2D"/>
        <enum name="VK_IMAGE_TYPE_2D_ALIAS" alias="VK_IMAGE_TYPE_2D"/>
    </enums>
    <commands/>
</registry>"#;
        let reg = parse(xml);
        let e = &reg.enums["VkImageType"];
        assert_eq!(e.values.len(), 2);
        assert_eq!(e.values[0].cpp_name, "e1D");
        assert_eq!(e.values[1].cpp_name, "e2D");
        assert_eq!(e.aliases.len(), 1);
        assert_eq!(e.resolve_alias("VK_IMAGE_TYPE_2D_ALIAS").unwrap().c_name, "VK_IMAGE_TYPE_2D");
    }

    #[test]
    fn disabled_extension_is_unwound() {
        let xml = r#"
<registry>
    <types>
        <type category="enum" name="VkResult"/>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_INSTANCE"><type>VK_DEFINE_HANDLE</type>(<name>VkInstance</name>)</type>
        <type category="struct" name="VkSecretInfo">
            <member><type>uint32_t</type> <name>value</name></member>
        </type>
    </types>
    <enums name="VkResult" type="enum">
        <enum value="0" name="VK_SUCCESS"/>
    </enums>
    <commands>
        <command>
            <proto><type>void</type> <name>vkSecretOp</name></proto>
            <param><type>VkInstance</type> <name>instance</name></param>
        </command>
    </commands>
    <extensions>
        <extension name="VK_TEST_secret" number="9" supported="disabled">
            <require>
                <type name="VkSecretInfo"/>
                <command name="vkSecretOp"/>
                <enum extends="VkResult" offset="0" extnumber="9" name="VK_ERROR_SECRET"/>
            </require>
        </extension>
    </extensions>
</registry>"#;
        let reg = parse(xml);
        assert!(!reg.structs.contains_key("VkSecretInfo"));
        assert!(!reg.commands.contains_key("vkSecretOp"));
        assert!(!reg.extensions.contains_key("VK_TEST_secret"));
        assert!(reg.enums["VkResult"]
            .values
            .iter()
            .all(|v| v.c_name != "VK_ERROR_SECRET"));
        assert!(!reg.handles["VkInstance"].commands.contains("vkSecretOp"));
    }

    #[test]
    fn extension_tags_commands_and_extends_enums() {
        let xml = r#"
<registry>
    <tags><tag name="KHR" author="Khronos" contact="x"/></tags>
    <types>
        <type category="enum" name="VkResult"/>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_INSTANCE"><type>VK_DEFINE_HANDLE</type>(<name>VkInstance</name>)</type>
    </types>
    <enums name="VkResult" type="enum">
        <enum value="0" name="VK_SUCCESS"/>
    </enums>
    <commands>
        <command>
            <proto><type>void</type> <name>vkPollEvents</name></proto>
            <param><type>VkInstance</type> <name>instance</name></param>
        </command>
    </commands>
    <extensions>
        <extension name="VK_KHR_surface" number="1" supported="vulkan" type="instance">
            <require>
                <command name="vkPollEvents"/>
                <enum extends="VkResult" offset="0" dir="-" name="VK_ERROR_SURFACE_LOST_KHR"/>
            </require>
        </extension>
    </extensions>
</registry>"#;
        let reg = parse(xml);
        assert!(reg.commands["vkPollEvents"]
            .extensions
            .contains("VK_KHR_surface"));
        let result = &reg.enums["VkResult"];
        let v = result
            .values
            .iter()
            .find(|v| v.c_name == "VK_ERROR_SURFACE_LOST_KHR")
            .expect("extension value added");
        assert_eq!(v.cpp_name, "eErrorSurfaceLostKHR");
    }
}
