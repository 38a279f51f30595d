//! Emitter — registry model → generated header text.
//!
//! Section order follows the target header's layout: license, prelude, base
//! types, enums with `to_string`, index traits, bitmasks, exceptions and
//! result plumbing, the static dispatcher (needed by the default-dispatch
//! template arguments), struct forward declarations, handle classes, struct
//! definitions, command definitions, structure-chain validation, the dynamic
//! dispatcher, and the hash block.

use anyhow::Result;
use indexmap::IndexSet;
use tracing::{debug, info};

use crate::classify::classify;
use crate::config::Config;
use crate::model::{Registry, TypeCategory};
use crate::names;
use crate::select::select;

pub mod commands;
pub mod enums;
pub mod handles;
pub mod structs;
pub mod support;

use handles::CommandAnalysis;

/// The generated header plus the counters callers may want to gate on.
#[derive(Debug)]
pub struct EmitOutput {
    pub header: String,
    /// Commands skipped because no overload shape matched.
    pub shape_misses: usize,
}

/// Emit the complete header.
pub fn emit(reg: &Registry, cfg: &Config) -> Result<EmitOutput> {
    let mut emitter = Emitter {
        reg,
        out: String::with_capacity(1 << 20),
        listed: IndexSet::new(),
        listing: IndexSet::new(),
    };

    let (analysis, shape_misses) = analyze_commands(reg);

    emitter.append_license();
    emitter.out.push_str(&support::emit_prelude(reg, cfg));
    emitter.out.push_str(&support::emit_base_types(reg));
    emitter.append_enums();
    emitter.out.push_str(&support::emit_index_type_traits(reg));
    emitter.append_bitmasks();
    emitter.out.push_str(&support::emit_result_exceptions(reg));
    emitter.out.push_str(&support::emit_dispatch_static(reg));
    emitter.append_forward_declarations();
    emitter.append_handles(&analysis);
    emitter.append_structs()?;
    emitter.append_command_definitions(&analysis);
    emitter.out.push_str(&support::emit_struct_extends(reg));
    emitter.out.push_str(&support::emit_dispatch_dynamic(reg));
    emitter
        .out
        .push_str("}  // namespace VULKAN_HPP_NAMESPACE\n\n");
    emitter.out.push_str(&support::emit_hashes(reg));
    emitter.out.push_str(&format!(
        "\n#endif  // {}\n",
        cfg.output.header_macro
    ));

    info!(
        bytes = emitter.out.len(),
        shape_misses, "header emission complete"
    );
    Ok(EmitOutput {
        header: emitter.out,
        shape_misses,
    })
}

/// Classify and select every command once; handle bodies and the definition
/// section both read from this.
fn analyze_commands(reg: &Registry) -> (CommandAnalysis, usize) {
    let mut analysis = CommandAnalysis::default();
    let mut misses = 0usize;
    for (name, cmd) in &reg.commands {
        let cls = classify(cmd, reg);
        match select(name, cmd, &cls, reg) {
            Some(selection) => {
                analysis.insert(name.clone(), (cls, selection));
            }
            None => misses += 1,
        }
    }
    (analysis, misses)
}

struct Emitter<'a> {
    reg: &'a Registry,
    out: String,
    /// Structs already emitted.
    listed: IndexSet<String>,
    /// Structs on the current DFS stack; re-entry means a pointer cycle and
    /// is not followed.
    listing: IndexSet<String>,
}

impl<'a> Emitter<'a> {
    fn append_license(&mut self) {
        if self.reg.license_header.is_empty() {
            return;
        }
        for line in self.reg.license_header.lines() {
            if line.trim().is_empty() {
                self.out.push_str("//\n");
            } else {
                self.out.push_str(&format!("// {}\n", line.trim()));
            }
        }
        self.out.push('\n');
    }

    fn append_enums(&mut self) {
        self.out.push_str("  //=== Enums ===\n\n");
        for (name, data) in &self.reg.enums {
            let mut block = String::new();
            if let Some(alias) = &data.alias {
                block.push_str(&format!(
                    "  using {} = {};\n\n",
                    names::cpp_type_name(name),
                    names::cpp_type_name(alias)
                ));
            } else {
                block.push_str(&enums::emit_enum(self.reg, name, data));
                block.push_str(&enums::emit_enum_to_string(name, data));
            }
            self.out
                .push_str(&support::wrap_type_protect(self.reg, name, block));
            debug!(name = %name, "emitted enum");
        }
    }

    fn append_bitmasks(&mut self) {
        self.out.push_str("  //=== Bitmasks ===\n\n");
        for (name, data) in &self.reg.bitmasks {
            let mut block = String::new();
            block.push_str(&enums::emit_bitmask(self.reg, name, data));
            block.push_str(&enums::emit_bitmask_operators(name, data));
            block.push_str(&enums::emit_bitmask_to_string(self.reg, name, data));
            self.out
                .push_str(&support::wrap_type_protect(self.reg, name, block));
            debug!(name = %name, "emitted bitmask");
        }
    }

    /// Handle classes and struct definitions reference each other by name;
    /// forward declarations break the knot.
    fn append_forward_declarations(&mut self) {
        self.out.push_str("  //=== Forward declarations ===\n\n");
        for (name, data) in &self.reg.structs {
            let keyword = if data.is_union { "union" } else { "struct" };
            self.out.push_str(&format!(
                "  {keyword} {};\n",
                names::cpp_type_name(name)
            ));
        }
        for (name, data) in &self.reg.handles {
            if name.is_empty() || data.alias.is_some() {
                continue;
            }
            self.out
                .push_str(&format!("  class {};\n", names::cpp_type_name(name)));
        }
        self.out.push('\n');
    }

    fn append_handles(&mut self, analysis: &CommandAnalysis) {
        self.out.push_str("  //=== Handles ===\n\n");
        // Classes first, the free functions of the empty-name handle last.
        for (name, data) in &self.reg.handles {
            if name.is_empty() {
                continue;
            }
            let block = handles::emit_handle(self.reg, name, data, analysis);
            self.out
                .push_str(&support::wrap_type_protect(self.reg, name, block));
            debug!(name = %name, commands = data.commands.len(), "emitted handle");
        }
        if let Some(free) = self.reg.handles.get("") {
            self.out
                .push_str(&handles::emit_handle(self.reg, "", free, analysis));
        }
    }

    fn append_structs(&mut self) -> Result<()> {
        self.out.push_str("  //=== Structs ===\n\n");
        let names: Vec<String> = self.reg.structs.keys().cloned().collect();
        for name in names {
            self.emit_struct_ordered(&name);
        }
        Ok(())
    }

    /// Depth-first emission: every struct a member embeds by value is
    /// emitted first. Pointer members only need the forward declarations,
    /// so self-referential structs terminate.
    fn emit_struct_ordered(&mut self, name: &str) {
        if self.listed.contains(name) || self.listing.contains(name) {
            return;
        }
        self.listing.insert(name.to_string());

        let deps: Vec<String> = self.reg.structs[name]
            .members
            .iter()
            .filter(|m| m.type_info.is_value())
            .filter(|m| {
                matches!(
                    self.reg.types.get(&m.type_info.ty),
                    Some(TypeCategory::Struct) | Some(TypeCategory::Union)
                )
            })
            .map(|m| m.type_info.ty.clone())
            .collect();
        for dep in deps {
            self.emit_struct_ordered(&dep);
        }

        self.listing.shift_remove(name);
        self.listed.insert(name.to_string());

        let data = &self.reg.structs[name];
        let block = structs::emit_struct(self.reg, name, data);
        self.out
            .push_str(&support::wrap_type_protect(self.reg, name, block));
        debug!(name = %name, members = data.members.len(), "emitted struct");
    }

    fn append_command_definitions(&mut self, analysis: &CommandAnalysis) {
        self.out.push_str("  //=== Command definitions ===\n\n");
        for (handle_name, handle) in &self.reg.handles {
            for command in &handle.commands {
                let Some((cls, selection)) = analysis.get(command) else {
                    continue;
                };
                let cmd = &self.reg.commands[command];
                let mut block = String::new();

                let mut names_to_emit: Vec<(String, String)> =
                    vec![(command.clone(), names::cpp_command_name(command))];
                if let Some(short) = shortened_destroy_name(command) {
                    names_to_emit.push((command.clone(), short));
                }
                for alias in cmd.aliases.keys() {
                    names_to_emit.push((alias.clone(), names::cpp_command_name(alias)));
                }

                for (c_name, method_base) in names_to_emit {
                    let ctx = commands::CommandContext {
                        reg: self.reg,
                        c_name: &c_name,
                        cmd,
                        cls,
                        handle: handle_name,
                    };
                    for overload in &selection.overloads {
                        let method_name = if overload.unique {
                            format!("{method_base}Unique")
                        } else if overload.kind == crate::select::OverloadKind::Singular {
                            names::strip_plural_s(&method_base)
                        } else {
                            method_base.clone()
                        };
                        block.push_str(&commands::emit_definition(&ctx, overload, &method_name));
                    }
                }

                match self.reg.protect_for_command(cmd) {
                    Some(protect) => self.out.push_str(&format!(
                        "#if defined( {protect} )\n{block}#endif /* {protect} */\n\n"
                    )),
                    None => self.out.push_str(&block),
                }
            }
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_registry;

    #[test]
    fn self_referential_struct_emits_once() {
        let reg = parse_registry(
            r#"
<registry>
    <types>
        <type name="uint32_t"/>
        <type category="struct" name="VkNode">
            <member><type>uint32_t</type> <name>value</name></member>
            <member optional="true">const <type>VkNode</type>* <name>pNext</name></member>
        </type>
    </types>
    <enums name="API Constants" type="constants"/>
    <commands/>
</registry>"#,
        )
        .unwrap();
        let cfg = Config::default();
        let out = emit(&reg, &cfg).unwrap();
        assert_eq!(out.header.matches("struct Node\n").count(), 1);
    }

    #[test]
    fn value_member_dependencies_emit_first() {
        let reg = parse_registry(
            r#"
<registry>
    <types>
        <type name="uint32_t"/>
        <type category="struct" name="VkOuter">
            <member><type>VkInner</type> <name>inner</name></member>
        </type>
        <type category="struct" name="VkInner">
            <member><type>uint32_t</type> <name>value</name></member>
        </type>
    </types>
    <enums name="API Constants" type="constants"/>
    <commands/>
</registry>"#,
        )
        .unwrap();
        let cfg = Config::default();
        let out = emit(&reg, &cfg).unwrap();
        let inner = out.header.find("struct Inner\n").expect("Inner emitted");
        let outer = out.header.find("struct Outer\n").expect("Outer emitted");
        assert!(inner < outer, "Inner must precede Outer");
    }
}
