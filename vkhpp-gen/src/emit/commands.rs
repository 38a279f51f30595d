//! Command overload emission — one declaration/definition pair per selected
//! overload shape.
//!
//! Declarations land inside the owning handle's class body; definitions are
//! collected into the command-definition section further down the header.

use crate::classify::Classification;
use crate::model::{CommandData, ParamData, Registry};
use crate::names;
use crate::select::{Overload, OverloadKind};

/// Everything needed to render one command for one handle.
pub struct CommandContext<'a> {
    pub reg: &'a Registry,
    /// The C entry point the body calls (primary name or alias).
    pub c_name: &'a str,
    pub cmd: &'a CommandData,
    pub cls: &'a Classification,
    /// Owning handle C name, empty for free functions.
    pub handle: &'a str,
}

impl<'a> CommandContext<'a> {
    fn handle_cpp(&self) -> String {
        names::cpp_type_name(self.handle)
    }

    /// The `m_buffer`-style member naming the wrapped C handle.
    fn handle_member(&self) -> String {
        format!("m_{}", names::start_lower_case(&self.handle_cpp()))
    }

    fn has_handle(&self) -> bool {
        !self.handle.is_empty()
    }

    fn param(&self, index: usize) -> &ParamData {
        &self.cmd.params[index]
    }

    fn returns_result(&self) -> bool {
        self.cmd.return_type == "VkResult"
    }

    /// Success codes beyond `eSuccess` force `ResultValue` returns instead
    /// of plain values. `eIncomplete` does not count: the enumerate loop
    /// absorbs it.
    fn multi_success(&self) -> bool {
        self.cmd
            .success_codes
            .iter()
            .filter(|c| *c != "VK_INCOMPLETE")
            .count()
            > 1
    }
}

/// Render the in-class declaration of one overload.
pub fn emit_declaration(ctx: &CommandContext, overload: &Overload, method_name: &str) -> String {
    let sig = build_signature(ctx, overload, method_name, true);
    let mut out = String::new();
    if overload.deprecated {
        out.push_str("    VULKAN_HPP_DEPRECATED( \"use the overload returning all values instead\" )\n");
    }
    out.push_str(&format!("    {}\n    {};\n\n", sig.template_decl, sig.prototype));
    wrap_enhanced_guard(out, overload)
}

/// Render the out-of-line definition of one overload.
pub fn emit_definition(ctx: &CommandContext, overload: &Overload, method_name: &str) -> String {
    let sig = build_signature(ctx, overload, method_name, false);
    let body = build_body(ctx, overload);
    let out = format!(
        "  {}\n  VULKAN_HPP_INLINE {}\n  {{\n{}  }}\n\n",
        sig.template_def, sig.prototype, body
    );
    wrap_enhanced_guard(out, overload)
}

/// Everything except the standard overload sits behind the enhanced-mode
/// macro gate.
fn wrap_enhanced_guard(text: String, overload: &Overload) -> String {
    if overload.kind == OverloadKind::Standard {
        text
    } else {
        format!("#ifndef VULKAN_HPP_DISABLE_ENHANCED_MODE\n{text}#endif /* VULKAN_HPP_DISABLE_ENHANCED_MODE */\n\n")
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

struct Signature {
    template_decl: String,
    template_def: String,
    prototype: String,
}

fn build_signature(
    ctx: &CommandContext,
    overload: &Overload,
    method_name: &str,
    declaration: bool,
) -> Signature {
    let mut template_params_decl: Vec<String> = Vec::new();
    let mut template_params_def: Vec<String> = Vec::new();

    if overload.kind == OverloadKind::Chained || overload.kind == OverloadKind::EnumerateChained {
        for p in ["typename X", "typename Y", "typename... Z"] {
            template_params_decl.push(p.into());
            template_params_def.push(p.into());
        }
    }
    let vectors = vector_returns(ctx, overload);
    // A unique vector flavor defaults its allocator over
    // `UniqueHandle<T, Dispatch>`, so Dispatch must be declared first.
    let dispatch_first = overload.unique && !vectors.is_empty();
    if dispatch_first {
        template_params_decl.push("typename Dispatch = VULKAN_HPP_DEFAULT_DISPATCHER_TYPE".into());
        template_params_def.push("typename Dispatch".into());
    }
    if overload.kind == OverloadKind::EnumerateChained {
        template_params_decl.push(
            "typename StructureChainAllocator = std::allocator<StructureChain<X, Y, Z...>>".into(),
        );
        template_params_def.push("typename StructureChainAllocator".into());
    }
    for ret in &vectors {
        let element = return_element_type(ctx, *ret);
        let allocator = allocator_name(&element);
        let stored = vector_element_type(ctx, *ret, overload);
        template_params_decl.push(format!("typename {allocator} = std::allocator<{stored}>"));
        template_params_def.push(format!("typename {allocator}"));
    }
    if !dispatch_first {
        template_params_decl.push("typename Dispatch = VULKAN_HPP_DEFAULT_DISPATCHER_TYPE".into());
        template_params_def.push("typename Dispatch".into());
    }
    if overload.with_allocator {
        // Constrain the explicit-allocator flavor so it never shadows the
        // defaulted one.
        for ret in &vectors {
            let element = return_element_type(ctx, *ret);
            let allocator = allocator_name(&element);
            let stored = vector_element_type(ctx, *ret, overload);
            template_params_decl.push(format!(
                "typename std::enable_if<std::is_same<typename {allocator}::value_type, {stored}>::value, int>::type = 0"
            ));
            template_params_def.push(format!(
                "typename std::enable_if<std::is_same<typename {allocator}::value_type, {stored}>::value, int>::type"
            ));
        }
    }

    let return_type = build_return_type(ctx, overload);
    let params = build_parameters(ctx, overload, declaration);
    let qualifiers = build_qualifiers(ctx, overload);

    let scope = if declaration || !ctx.has_handle() {
        String::new()
    } else {
        format!("{}::", ctx.handle_cpp())
    };
    let nodiscard = if declaration && return_type != "void" {
        "VULKAN_HPP_NODISCARD ".to_string()
    } else {
        String::new()
    };

    Signature {
        template_decl: format!("template <{}>", template_params_decl.join(", ")),
        template_def: format!("template <{}>", template_params_def.join(", ")),
        prototype: format!(
            "{nodiscard}{return_type} {scope}{method_name}( {params} ){qualifiers}"
        ),
    }
}

fn build_qualifiers(ctx: &CommandContext, overload: &Overload) -> String {
    let mut q = String::new();
    if ctx.has_handle() {
        q.push_str(" const");
    }
    // Only raw mirrors and void enhanced flavors are noexcept; everything
    // with result plumbing may throw.
    let noexcept = match overload.kind {
        OverloadKind::Standard => true,
        OverloadKind::Enhanced | OverloadKind::Chained => !ctx.returns_result(),
        _ => false,
    };
    if noexcept && !overload.unique {
        q.push_str(" VULKAN_HPP_NOEXCEPT");
    }
    q
}

fn build_return_type(ctx: &CommandContext, overload: &Overload) -> String {
    match overload.kind {
        OverloadKind::Standard => {
            if ctx.returns_result() {
                "Result".to_string()
            } else {
                names::cpp_type_name(&ctx.cmd.return_type)
            }
        }
        OverloadKind::Enhanced => {
            let value = match scalar_return(ctx) {
                Some(ret) => wrapped_return_type(ctx, ret, overload),
                None => "void".to_string(),
            };
            finish_return_type(ctx, value)
        }
        OverloadKind::EnhancedVector | OverloadKind::Enumerate | OverloadKind::TwoVectors => {
            if overload.deprecated {
                // Caller-provided buffers; only the remaining scalar comes
                // back.
                let value = scalar_return(ctx)
                    .map(|i| return_element_type(ctx, i))
                    .unwrap_or_else(|| "uint32_t".to_string());
                return finish_return_type(ctx, value);
            }
            let vectors = vector_returns(ctx, overload);
            let mut parts: Vec<String> = vectors
                .iter()
                .map(|ret| {
                    let allocator = allocator_name(&return_element_type(ctx, *ret));
                    let stored = vector_element_type(ctx, *ret, overload);
                    format!("std::vector<{stored}, {allocator}>")
                })
                .collect();
            if let Some(extra) = extra_scalar_return(ctx, overload) {
                parts.push(wrapped_return_type(ctx, extra, overload));
            }
            let value = if parts.len() == 1 {
                parts.remove(0)
            } else {
                format!("std::pair<{}>", parts.join(", "))
            };
            finish_return_type(ctx, value)
        }
        OverloadKind::Singular => {
            let ret = first_vector_return(ctx).expect("singular implies a vector return");
            finish_return_type(ctx, wrapped_return_type(ctx, ret, overload))
        }
        OverloadKind::Chained => {
            finish_return_type(ctx, "StructureChain<X, Y, Z...>".to_string())
        }
        OverloadKind::EnumerateChained => {
            let allocator = "StructureChainAllocator".to_string();
            finish_return_type(
                ctx,
                format!("std::vector<StructureChain<X, Y, Z...>, {allocator}>"),
            )
        }
    }
}

/// Wrap an enhanced return value in the result plumbing the command needs.
fn finish_return_type(ctx: &CommandContext, value: String) -> String {
    if !ctx.returns_result() {
        return value;
    }
    if ctx.multi_success() {
        if value == "void" {
            "Result".to_string()
        } else {
            format!("ResultValue<{value}>")
        }
    } else {
        format!("typename ResultValueType<{value}>::type")
    }
}

fn wrapped_return_type(ctx: &CommandContext, ret: usize, overload: &Overload) -> String {
    let element = return_element_type(ctx, ret);
    if overload.unique {
        format!("UniqueHandle<{element}, Dispatch>")
    } else {
        element
    }
}

fn build_parameters(ctx: &CommandContext, overload: &Overload, declaration: bool) -> String {
    let mut params: Vec<String> = Vec::new();
    match overload.kind {
        OverloadKind::Standard => {
            for (index, param) in ctx.cmd.params.iter().enumerate() {
                if index == 0 && ctx.has_handle() {
                    continue;
                }
                params.push(format!("{} {}", standard_param_type(ctx, param), param.name));
            }
        }
        _ => {
            for (index, param) in ctx.cmd.params.iter().enumerate() {
                if ctx.cls.skipped_params.contains(&index) {
                    continue;
                }
                if overload.kind == OverloadKind::Singular
                    && Some(index) == singular_skipped_vector(ctx)
                {
                    // The sibling input vector collapses to one element.
                    let element = element_type(ctx, param);
                    params.push(format!(
                        "const {} & {}",
                        element.trim_start_matches("const "),
                        names::singular_param_name(&param.name)
                    ));
                    continue;
                }
                params.push(enhanced_param(ctx, index, param, declaration));
            }
            if overload.deprecated {
                // Caller-provided output buffers.
                for ret in returned_vectors(ctx) {
                    let element = return_element_type(ctx, ret);
                    params.push(format!(
                        "ArrayProxy<{element}> const & {}",
                        names::enhanced_param_name(&ctx.param(ret).name)
                    ));
                }
            }
        }
    }
    let dispatch = if declaration {
        "Dispatch const & d VULKAN_HPP_DEFAULT_DISPATCHER_ASSIGNMENT"
    } else {
        "Dispatch const & d"
    };
    params.push(dispatch.to_string());
    params.join(", ")
}

/// The enhanced spelling of one exposed parameter. Default arguments only
/// appear on declarations.
fn enhanced_param(
    ctx: &CommandContext,
    index: usize,
    param: &ParamData,
    declaration: bool,
) -> String {
    let name = names::enhanced_param_name(&param.name);
    if ctx.cls.is_vector(index) {
        let element = element_type(ctx, param);
        return format!("ArrayProxy<{element}> const & {name}");
    }
    if param.type_info.is_const_pointer() {
        if param.type_info.ty == "VkAllocationCallbacks" {
            let default = if declaration {
                " VULKAN_HPP_DEFAULT_ARGUMENT_NULLPTR_ASSIGNMENT"
            } else {
                ""
            };
            return format!("Optional<const AllocationCallbacks> {name}{default}");
        }
        if param.type_info.ty == "char" {
            // null-terminated string
            return format!("const char * {name}");
        }
        if param.type_info.ty == "void" {
            return format!("const void * {name}");
        }
        let cpp = cpp_type(ctx.reg, &param.type_info.ty);
        return format!("const {cpp} & {name}");
    }
    format!("{} {}", standard_param_type(ctx, param), param.name)
}

/// The raw C++ spelling used by the standard overload.
fn standard_param_type(ctx: &CommandContext, param: &ParamData) -> String {
    let base = cpp_type(ctx.reg, &param.type_info.ty);
    let mut out = String::new();
    if !param.type_info.prefix.is_empty() {
        out.push_str(&param.type_info.prefix);
        out.push(' ');
    }
    out.push_str(&base);
    if !param.type_info.postfix.is_empty() {
        out.push(' ');
        out.push_str(&param.type_info.postfix);
    }
    out
}

/// `const VkPipelineCache` element spelling for ArrayProxy parameters.
fn element_type(ctx: &CommandContext, param: &ParamData) -> String {
    let cpp = cpp_type(ctx.reg, &param.type_info.ty);
    if param.type_info.is_const_pointer() {
        format!("const {cpp}")
    } else {
        cpp
    }
}

fn cpp_type(reg: &Registry, c_ty: &str) -> String {
    if c_ty.starts_with("Vk") && reg.types.contains_key(c_ty) {
        names::cpp_type_name(c_ty)
    } else {
        c_ty.to_string()
    }
}

fn allocator_name(element: &str) -> String {
    let stem = element
        .trim_start_matches("const ")
        .replace("VULKAN_HPP_NAMESPACE::", "");
    let stem = if stem == "void" || stem == "uint8_t" {
        "Uint8_t".to_string()
    } else {
        stem
    };
    format!("{}Allocator", names::start_upper_case(&stem))
}

// ---------------------------------------------------------------------------
// Return-parameter views
// ---------------------------------------------------------------------------

fn scalar_return(ctx: &CommandContext) -> Option<usize> {
    ctx.cls
        .return_params
        .iter()
        .copied()
        .find(|i| !ctx.cls.is_vector(*i))
}

fn first_vector_return(ctx: &CommandContext) -> Option<usize> {
    ctx.cls
        .return_params
        .iter()
        .copied()
        .find(|i| ctx.cls.is_vector(*i))
}

/// The returned vectors an overload materializes. Deprecated flavors take
/// caller-provided buffers instead, so they materialize none.
fn vector_returns(ctx: &CommandContext, overload: &Overload) -> Vec<usize> {
    if overload.deprecated {
        return Vec::new();
    }
    match overload.kind {
        OverloadKind::EnhancedVector | OverloadKind::Enumerate | OverloadKind::TwoVectors => ctx
            .cls
            .return_params
            .iter()
            .copied()
            .filter(|i| ctx.cls.is_vector(*i))
            .collect(),
        _ => Vec::new(),
    }
}

/// The returned vectors regardless of flavor.
fn returned_vectors(ctx: &CommandContext) -> Vec<usize> {
    ctx.cls
        .return_params
        .iter()
        .copied()
        .filter(|i| ctx.cls.is_vector(*i))
        .collect()
}

/// A non-vector return accompanying a returned vector (the deviation value
/// of `vkGetCalibratedTimestampsKHR`).
fn extra_scalar_return(ctx: &CommandContext, overload: &Overload) -> Option<usize> {
    if overload.kind != OverloadKind::EnhancedVector || overload.deprecated {
        return None;
    }
    ctx.cls
        .return_params
        .iter()
        .copied()
        .find(|i| !ctx.cls.is_vector(*i) && !is_count_of_returned_vector(ctx, *i))
}

/// True when `index` is the length parameter of a returned vector (an
/// enumerate count, not a standalone scalar return).
fn is_count_of_returned_vector(ctx: &CommandContext, index: usize) -> bool {
    ctx.cls
        .vector_params
        .iter()
        .any(|(v, len)| ctx.cls.return_params.contains(v) && len.param_index() == Some(index))
}

/// The element type of a returned vector / the type of a returned scalar.
fn return_element_type(ctx: &CommandContext, ret: usize) -> String {
    let ty = &ctx.param(ret).type_info.ty;
    if ty == "void" {
        "uint8_t".to_string()
    } else {
        cpp_type(ctx.reg, ty)
    }
}

/// What a returned vector stores: the element itself, or its RAII wrapper
/// for unique flavors.
fn vector_element_type(ctx: &CommandContext, ret: usize, overload: &Overload) -> String {
    let element = return_element_type(ctx, ret);
    if overload.unique {
        format!("UniqueHandle<{element}, Dispatch>")
    } else {
        element
    }
}

/// The input vector a singular overload exposes as a single reference.
fn singular_skipped_vector(ctx: &CommandContext) -> Option<usize> {
    let len = ctx.cls.singular_len?;
    ctx.cls
        .vectors_sized_by(len)
        .into_iter()
        .find(|v| !ctx.cls.return_params.contains(v))
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

fn build_body(ctx: &CommandContext, overload: &Overload) -> String {
    match overload.kind {
        OverloadKind::Standard => build_standard_body(ctx),
        OverloadKind::Enhanced => build_enhanced_body(ctx, overload),
        OverloadKind::EnhancedVector => build_vector_body(ctx, overload),
        OverloadKind::TwoVectors => {
            if overload.deprecated {
                build_deprecated_buffer_body(ctx, overload)
            } else {
                build_two_vectors_body(ctx)
            }
        }
        OverloadKind::Singular => build_singular_body(ctx, overload),
        OverloadKind::Chained => build_chained_body(ctx),
        OverloadKind::Enumerate | OverloadKind::EnumerateChained => {
            build_enumerate_body(ctx, overload)
        }
    }
}

/// `d.vkCmd( m_handle, args… )`, cast back to the wrapped return type.
fn build_standard_body(ctx: &CommandContext) -> String {
    let mut args: Vec<String> = Vec::new();
    for (index, param) in ctx.cmd.params.iter().enumerate() {
        if index == 0 && ctx.has_handle() {
            args.push(ctx.handle_member());
            continue;
        }
        args.push(standard_call_arg(ctx, param));
    }
    let call = format!("d.{}( {} )", ctx.c_name, args.join(", "));
    if ctx.returns_result() {
        format!("    return static_cast<Result>( {call} );\n")
    } else if ctx.cmd.return_type == "void" {
        format!("    {call};\n")
    } else {
        format!(
            "    return static_cast<{}>( {call} );\n",
            names::cpp_type_name(&ctx.cmd.return_type)
        )
    }
}

/// Cast one raw parameter back to its C spelling for the call.
fn standard_call_arg(ctx: &CommandContext, param: &ParamData) -> String {
    let ty = &param.type_info.ty;
    let wrapped = ty.starts_with("Vk") && ctx.reg.types.contains_key(ty);
    if !wrapped {
        return param.name.clone();
    }
    if param.type_info.is_value() {
        format!("static_cast<{ty}>( {} )", param.name)
    } else {
        let constness = if param.type_info.is_const_pointer() {
            "const "
        } else {
            ""
        };
        let stars = "*".repeat(param.type_info.pointer_depth());
        format!(
            "reinterpret_cast<{constness}{ty} {stars}>( {} )",
            param.name
        )
    }
}

fn build_enhanced_body(ctx: &CommandContext, overload: &Overload) -> String {
    let mut out = String::new();
    let ret = scalar_return(ctx);
    let ret_name = ret.map(|r| names::enhanced_param_name(&ctx.param(r).name));

    if let (Some(r), Some(name)) = (ret, &ret_name) {
        out.push_str(&format!("    {} {name};\n", return_element_type(ctx, r)));
    }

    let call = enhanced_call(ctx, overload, ret, ret_name.as_deref());
    if ctx.returns_result() {
        out.push_str(&format!("    Result result = static_cast<Result>( {call} );\n"));
        out.push_str(&result_check(ctx));
        match (&ret_name, overload.unique) {
            (Some(name), false) => out.push_str(&format!(
                "    return createResultValueType( result, {name} );\n"
            )),
            (Some(name), true) => {
                out.push_str(&unique_deleter_line(ctx));
                out.push_str(&format!(
                    "    return createResultValueType( result, UniqueHandle<{}, Dispatch>( {name}, deleter ) );\n",
                    return_element_type(ctx, ret.unwrap())
                ));
            }
            (None, _) => out.push_str("    return createResultValueType( result );\n"),
        }
    } else {
        out.push_str(&format!("    {call};\n"));
        if let Some(name) = ret_name {
            out.push_str(&format!("    return {name};\n"));
        }
    }
    out
}

/// The deleter an RAII wrapper hands to `UniqueHandle`.
fn unique_deleter_line(ctx: &CommandContext) -> String {
    let has_allocator = ctx
        .cmd
        .params
        .iter()
        .any(|p| p.type_info.ty == "VkAllocationCallbacks");
    let allocator_arg = if has_allocator { "allocator, " } else { "" };
    if ctx.has_handle() {
        format!(
            "    ObjectDestroy<{}, Dispatch> deleter( *this, {allocator_arg}d );\n",
            ctx.handle_cpp()
        )
    } else {
        format!("    ObjectDestroy<NoParent, Dispatch> deleter( {allocator_arg}d );\n")
    }
}

/// The C call of an enhanced flavor: skipped lengths come from vector sizes,
/// returns from local buffers.
fn enhanced_call(
    ctx: &CommandContext,
    overload: &Overload,
    scalar_ret: Option<usize>,
    scalar_name: Option<&str>,
) -> String {
    let mut args: Vec<String> = Vec::new();
    for (index, param) in ctx.cmd.params.iter().enumerate() {
        if index == 0 && ctx.has_handle() {
            args.push(ctx.handle_member());
            continue;
        }
        if Some(index) == scalar_ret {
            let ty = &param.type_info.ty;
            let name = scalar_name.unwrap();
            if ty.starts_with("Vk") && ctx.reg.types.contains_key(ty) {
                args.push(format!("reinterpret_cast<{ty} *>( &{name} )"));
            } else {
                args.push(format!("&{name}"));
            }
            continue;
        }
        if let Some(sized) = length_argument(ctx, overload, index) {
            args.push(sized);
            continue;
        }
        if ctx.cls.is_vector(index) && !ctx.cls.return_params.contains(&index) {
            let name = names::enhanced_param_name(&param.name);
            let name = if overload.kind == OverloadKind::Singular
                && Some(index) == singular_skipped_vector(ctx)
            {
                format!("&{}", names::singular_param_name(&param.name))
            } else {
                format!("{name}.data()")
            };
            args.push(cast_pointer(ctx, param, &name));
            continue;
        }
        if ctx.cls.return_params.contains(&index) {
            // Vector returns are materialized by the caller of this helper.
            let name = names::enhanced_param_name(&param.name);
            args.push(cast_pointer(ctx, param, &format!("{name}.data()")));
            continue;
        }
        args.push(enhanced_call_arg(ctx, param));
    }
    format!("d.{}( {} )", ctx.c_name, args.join(", "))
}

/// Length arguments for enhanced calls: computed from the sized vector, or
/// the literal `1` in singular flavors.
fn length_argument(ctx: &CommandContext, overload: &Overload, index: usize) -> Option<String> {
    let vectors = ctx.cls.vectors_sized_by(index);
    if vectors.is_empty() {
        return None;
    }
    let len_ty = &ctx.param(index).type_info.ty;
    if overload.kind == OverloadKind::Singular {
        return Some("1".to_string());
    }
    if overload.kind == OverloadKind::Enumerate || overload.kind == OverloadKind::EnumerateChained
    {
        // The count is a local in the two-step loop.
        return Some(format!(
            "&{}",
            names::enhanced_param_name(&ctx.param(index).name)
        ));
    }
    // Prefer an input vector as the size source; returned vectors are sized
    // from it.
    let source = vectors
        .iter()
        .copied()
        .find(|v| !ctx.cls.return_params.contains(v))
        .or_else(|| vectors.first().copied())?;
    let source_name = names::enhanced_param_name(&ctx.param(source).name);
    Some(format!("static_cast<{len_ty}>( {source_name}.size() )"))
}

fn cast_pointer(ctx: &CommandContext, param: &ParamData, expr: &str) -> String {
    let ty = &param.type_info.ty;
    if !(ty.starts_with("Vk") && ctx.reg.types.contains_key(ty)) {
        return expr.to_string();
    }
    let constness = if param.type_info.is_const_pointer() {
        "const "
    } else {
        ""
    };
    format!("reinterpret_cast<{constness}{ty} *>( {expr} )")
}

fn enhanced_call_arg(ctx: &CommandContext, param: &ParamData) -> String {
    let ty = &param.type_info.ty;
    let name = names::enhanced_param_name(&param.name);
    if param.type_info.is_const_pointer() {
        if ty == "VkAllocationCallbacks" {
            return format!(
                "reinterpret_cast<const VkAllocationCallbacks *>( static_cast<const AllocationCallbacks *>( {name} ) )"
            );
        }
        if ty == "char" || ty == "void" {
            return name;
        }
        if ty.starts_with("Vk") && ctx.reg.types.contains_key(ty) {
            return format!("reinterpret_cast<const {ty} *>( &{name} )");
        }
        return name;
    }
    if param.type_info.is_value() && ty.starts_with("Vk") && ctx.reg.types.contains_key(ty) {
        return format!("static_cast<{ty}>( {} )", param.name);
    }
    param.name.clone()
}

/// Known-size vector flavors (`vkCreateGraphicsPipelines` family): allocate,
/// call once, wrap.
fn build_vector_body(ctx: &CommandContext, overload: &Overload) -> String {
    let mut out = String::new();
    let vectors = vector_returns(ctx, overload);

    if overload.deprecated {
        return build_deprecated_buffer_body(ctx, overload);
    }

    for ret in &vectors {
        let element = return_element_type(ctx, *ret);
        let name = names::enhanced_param_name(&ctx.param(*ret).name);
        let size = vector_size_expr(ctx, *ret);
        // The declared allocator applies to what the overload returns; the
        // staging vector of raw handles in unique flavors uses the default.
        let allocator = if overload.unique {
            String::new()
        } else {
            format!(", {}", allocator_name(&element))
        };
        out.push_str(&format!(
            "    std::vector<{element}{allocator}> {name}( {size} );\n"
        ));
    }
    if let Some(extra) = extra_scalar_return(ctx, overload) {
        let name = names::enhanced_param_name(&ctx.param(extra).name);
        out.push_str(&format!("    {} {name};\n", return_element_type(ctx, extra)));
    }

    let extra = extra_scalar_return(ctx, overload);
    let extra_name = extra.map(|e| names::enhanced_param_name(&ctx.param(e).name));
    let call = enhanced_call(ctx, overload, extra, extra_name.as_deref());
    out.push_str(&format!("    Result result = static_cast<Result>( {call} );\n"));
    out.push_str(&result_check(ctx));

    let mut value: Vec<String> = vectors
        .iter()
        .map(|r| names::enhanced_param_name(&ctx.param(*r).name))
        .collect();
    if let Some(name) = extra_name {
        value.push(name);
    }
    let value = if value.len() == 1 {
        value.remove(0)
    } else {
        format!("std::make_pair( {} )", value.join(", "))
    };

    if overload.unique {
        let ret = vectors[0];
        let element = return_element_type(ctx, ret);
        let allocator = allocator_name(&element);
        let name = names::enhanced_param_name(&ctx.param(ret).name);
        let unique_name = format!("unique{}", names::start_upper_case(&name));
        out.push_str(&format!(
            "    std::vector<UniqueHandle<{element}, Dispatch>, {allocator}> {unique_name};\n"
        ));
        out.push_str(&format!("    {unique_name}.reserve( {name}.size() );\n"));
        out.push_str(&unique_deleter_line(ctx));
        out.push_str(&format!(
            "    for ( auto const & handle : {name} )\n    {{\n      {unique_name}.push_back( UniqueHandle<{element}, Dispatch>( handle, deleter ) );\n    }}\n"
        ));
        out.push_str(&format!(
            "    return createResultValueType( result, std::move( {unique_name} ) );\n"
        ));
    } else {
        out.push_str(&format!(
            "    return createResultValueType( result, {value} );\n"
        ));
    }
    out
}

/// Deprecated caller-allocated flavor: the output vectors arrive as
/// `ArrayProxy` buffers, the call runs once, only the count comes back.
fn build_deprecated_buffer_body(ctx: &CommandContext, overload: &Overload) -> String {
    let count = scalar_return(ctx);
    let count_name = count
        .map(|i| names::enhanced_param_name(&ctx.param(i).name))
        .unwrap_or_else(|| "count".to_string());

    let mut args: Vec<String> = Vec::new();
    for (index, param) in ctx.cmd.params.iter().enumerate() {
        if index == 0 && ctx.has_handle() {
            args.push(ctx.handle_member());
            continue;
        }
        if Some(index) == count {
            args.push(format!("&{count_name}"));
            continue;
        }
        if ctx.cls.return_params.contains(&index) {
            let name = names::enhanced_param_name(&param.name);
            args.push(cast_pointer(ctx, param, &format!("{name}.data()")));
            continue;
        }
        if let Some(sized) = length_argument(ctx, overload, index) {
            args.push(sized);
            continue;
        }
        if ctx.cls.is_vector(index) {
            let name = names::enhanced_param_name(&param.name);
            args.push(cast_pointer(ctx, param, &format!("{name}.data()")));
            continue;
        }
        args.push(enhanced_call_arg(ctx, param));
    }

    let mut out = String::new();
    if let Some(i) = count {
        out.push_str(&format!(
            "    {} {count_name};\n",
            ctx.param(i).type_info.ty
        ));
    }
    out.push_str(&format!(
        "    Result result = static_cast<Result>( d.{}( {} ) );\n",
        ctx.c_name,
        args.join(", ")
    ));
    out.push_str(&result_check(ctx));
    out.push_str(&format!(
        "    return createResultValueType( result, {count_name} );\n"
    ));
    out
}

/// Two returned co-sized vectors behind one returned count: the two-step
/// loop fills both buffers together.
fn build_two_vectors_body(ctx: &CommandContext) -> String {
    let count = scalar_return(ctx).expect("two-vectors implies a returned count");
    let count_name = names::enhanced_param_name(&ctx.param(count).name);
    let count_ty = ctx.param(count).type_info.ty.clone();
    let vectors: Vec<usize> = ctx
        .cls
        .return_params
        .iter()
        .copied()
        .filter(|i| ctx.cls.is_vector(*i))
        .collect();

    let mut out = String::new();
    for v in &vectors {
        let element = return_element_type(ctx, *v);
        let allocator = allocator_name(&element);
        let name = names::enhanced_param_name(&ctx.param(*v).name);
        out.push_str(&format!("    std::vector<{element}, {allocator}> {name};\n"));
    }
    out.push_str(&format!("    {count_ty} {count_name};\n"));

    let call_with = |fill: bool| -> String {
        let mut args: Vec<String> = Vec::new();
        for (index, param) in ctx.cmd.params.iter().enumerate() {
            if index == 0 && ctx.has_handle() {
                args.push(ctx.handle_member());
                continue;
            }
            if index == count {
                args.push(format!("&{count_name}"));
                continue;
            }
            if vectors.contains(&index) {
                if fill {
                    let name = names::enhanced_param_name(&param.name);
                    args.push(cast_pointer(ctx, param, &format!("{name}.data()")));
                } else {
                    args.push("nullptr".to_string());
                }
                continue;
            }
            args.push(enhanced_call_arg(ctx, param));
        }
        format!("d.{}( {} )", ctx.c_name, args.join(", "))
    };

    out.push_str("    Result result;\n    do\n    {\n");
    out.push_str(&format!(
        "      result = static_cast<Result>( {} );\n",
        call_with(false)
    ));
    out.push_str(&format!(
        "      if ( ( result == Result::eSuccess ) && {count_name} )\n      {{\n"
    ));
    for v in &vectors {
        let name = names::enhanced_param_name(&ctx.param(*v).name);
        out.push_str(&format!("        {name}.resize( {count_name} );\n"));
    }
    out.push_str(&format!(
        "        result = static_cast<Result>( {} );\n      }}\n",
        call_with(true)
    ));
    out.push_str("    } while ( result == Result::eIncomplete );\n");
    out.push_str(&result_check(ctx));
    for v in &vectors {
        let name = names::enhanced_param_name(&ctx.param(*v).name);
        out.push_str(&format!(
            "    if ( {count_name} < {name}.size() )\n    {{\n      {name}.resize( {count_name} );\n    }}\n"
        ));
    }
    let pair = vectors
        .iter()
        .map(|v| names::enhanced_param_name(&ctx.param(*v).name))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!(
        "    return createResultValueType( result, std::make_pair( {pair} ) );\n"
    ));
    out
}

/// The size expression of a returned vector with a known length.
fn vector_size_expr(ctx: &CommandContext, ret: usize) -> String {
    match &ctx.cls.vector_params[&ret] {
        crate::classify::VectorLen::Param(len) => {
            let vectors = ctx.cls.vectors_sized_by(*len);
            let source = vectors
                .iter()
                .copied()
                .find(|v| !ctx.cls.return_params.contains(v));
            match source {
                Some(src) => format!(
                    "{}.size()",
                    names::enhanced_param_name(&ctx.param(src).name)
                ),
                None => names::enhanced_param_name(&ctx.param(*len).name),
            }
        }
        crate::classify::VectorLen::Member { param, member } => {
            format!(
                "{}.{member}",
                names::enhanced_param_name(&ctx.param(*param).name)
            )
        }
    }
}

fn build_singular_body(ctx: &CommandContext, overload: &Overload) -> String {
    let mut out = String::new();
    let ret = first_vector_return(ctx).expect("singular implies a vector return");
    let element = return_element_type(ctx, ret);
    let name = names::singular_param_name(&ctx.param(ret).name);

    out.push_str(&format!("    {element} {name};\n"));

    // The call passes 1 for the shared length and single references for both
    // vectors.
    let mut args: Vec<String> = Vec::new();
    for (index, param) in ctx.cmd.params.iter().enumerate() {
        if index == 0 && ctx.has_handle() {
            args.push(ctx.handle_member());
            continue;
        }
        if Some(index) == ctx.cls.singular_len {
            args.push("1".to_string());
            continue;
        }
        if index == ret {
            args.push(cast_pointer(ctx, param, &format!("&{name}")));
            continue;
        }
        if Some(index) == singular_skipped_vector(ctx) {
            let singular = names::singular_param_name(&param.name);
            args.push(cast_pointer(ctx, param, &format!("&{singular}")));
            continue;
        }
        args.push(enhanced_call_arg(ctx, param));
    }
    let call = format!("d.{}( {} )", ctx.c_name, args.join(", "));

    if ctx.returns_result() {
        out.push_str(&format!("    Result result = static_cast<Result>( {call} );\n"));
        out.push_str(&result_check(ctx));
        if overload.unique {
            out.push_str(&unique_deleter_line(ctx));
            out.push_str(&format!(
                "    return createResultValueType( result, UniqueHandle<{element}, Dispatch>( {name}, deleter ) );\n"
            ));
        } else {
            out.push_str(&format!(
                "    return createResultValueType( result, {name} );\n"
            ));
        }
    } else {
        out.push_str(&format!("    {call};\n    return {name};\n"));
    }
    out
}

/// `StructureChain` flavor: fill the anchor inside the chain, call, return
/// the chain.
fn build_chained_body(ctx: &CommandContext) -> String {
    let ret = scalar_return(ctx).expect("chained implies a scalar struct return");
    let element = return_element_type(ctx, ret);
    let name = names::enhanced_param_name(&ctx.param(ret).name);

    let mut args: Vec<String> = Vec::new();
    for (index, param) in ctx.cmd.params.iter().enumerate() {
        if index == 0 && ctx.has_handle() {
            args.push(ctx.handle_member());
            continue;
        }
        if index == ret {
            args.push(format!(
                "reinterpret_cast<{} *>( &{name} )",
                param.type_info.ty
            ));
            continue;
        }
        args.push(enhanced_call_arg(ctx, param));
    }
    let call = format!("d.{}( {} )", ctx.c_name, args.join(", "));

    let mut out = String::new();
    out.push_str("    StructureChain<X, Y, Z...> structureChain;\n");
    out.push_str(&format!(
        "    {element} & {name} = structureChain.template get<{element}>();\n"
    ));
    if ctx.returns_result() {
        out.push_str(&format!("    Result result = static_cast<Result>( {call} );\n"));
        out.push_str(&result_check(ctx));
        out.push_str("    return createResultValueType( result, structureChain );\n");
    } else {
        out.push_str(&format!("    {call};\n"));
        out.push_str("    return structureChain;\n");
    }
    out
}

/// Two-step size-then-fill; `VkResult` commands loop while `eIncomplete` and
/// trim to the written count.
fn build_enumerate_body(ctx: &CommandContext, overload: &Overload) -> String {
    let count = scalar_return(ctx).expect("enumerate implies a returned count");
    let vec_ret = first_vector_return(ctx).expect("enumerate implies a returned vector");
    let count_name = names::enhanced_param_name(&ctx.param(count).name);
    let vec_name = names::enhanced_param_name(&ctx.param(vec_ret).name);
    let count_ty = &ctx.param(count).type_info.ty;

    let (element, vector_decl) = if overload.kind == OverloadKind::EnumerateChained {
        let decl = format!(
            "    std::vector<StructureChain<X, Y, Z...>, StructureChainAllocator> {vec_name};\n"
        );
        (return_element_type(ctx, vec_ret), decl)
    } else {
        let element = return_element_type(ctx, vec_ret);
        let allocator = allocator_name(&element);
        (
            element.clone(),
            format!("    std::vector<{element}, {allocator}> {vec_name};\n"),
        )
    };

    let call_with = |buffer: &str| -> String {
        let mut args: Vec<String> = Vec::new();
        for (index, param) in ctx.cmd.params.iter().enumerate() {
            if index == 0 && ctx.has_handle() {
                args.push(ctx.handle_member());
                continue;
            }
            if index == count {
                args.push(format!("&{count_name}"));
                continue;
            }
            if index == vec_ret {
                args.push(buffer.to_string());
                continue;
            }
            args.push(enhanced_call_arg(ctx, param));
        }
        format!("d.{}( {} )", ctx.c_name, args.join(", "))
    };

    let fill_buffer = if overload.kind == OverloadKind::EnumerateChained {
        format!("reinterpret_cast<{} *>( structures.data() )", ctx.param(vec_ret).type_info.ty)
    } else {
        cast_pointer(ctx, ctx.param(vec_ret), &format!("{vec_name}.data()"))
    };

    let mut out = String::new();
    out.push_str(&vector_decl);
    if overload.kind == OverloadKind::EnumerateChained {
        out.push_str(&format!("    std::vector<{element}> structures;\n"));
    }
    out.push_str(&format!("    {count_ty} {count_name};\n"));

    if ctx.returns_result() {
        out.push_str("    Result result;\n");
        out.push_str("    do\n    {\n");
        out.push_str(&format!(
            "      result = static_cast<Result>( {} );\n",
            call_with("nullptr")
        ));
        out.push_str(&format!(
            "      if ( ( result == Result::eSuccess ) && {count_name} )\n      {{\n"
        ));
        out.push_str(&resize_lines(overload, &vec_name, &count_name));
        out.push_str(&format!(
            "        result = static_cast<Result>( {} );\n      }}\n",
            call_with(&fill_buffer)
        ));
        out.push_str("    } while ( result == Result::eIncomplete );\n");
        out.push_str(&result_check(ctx));
        out.push_str(&format!(
            "    VULKAN_HPP_ASSERT( {count_name} <= {vec_name}.size() );\n"
        ));
        out.push_str(&format!(
            "    if ( {count_name} < {vec_name}.size() )\n    {{\n      {vec_name}.resize( {count_name} );\n    }}\n"
        ));
        out.push_str(&chain_relink_lines(overload, &vec_name, &count_name));
        out.push_str(&format!(
            "    return createResultValueType( result, {vec_name} );\n"
        ));
    } else {
        out.push_str(&format!("    {};\n", call_with("nullptr")));
        out.push_str(&resize_lines(overload, &vec_name, &count_name));
        out.push_str(&format!("    {};\n", call_with(&fill_buffer)));
        out.push_str(&format!(
            "    VULKAN_HPP_ASSERT( {count_name} <= {vec_name}.size() );\n"
        ));
        out.push_str(&chain_relink_lines(overload, &vec_name, &count_name));
        out.push_str(&format!("    return {vec_name};\n"));
    }
    out
}

fn resize_lines(overload: &Overload, vec_name: &str, count_name: &str) -> String {
    if overload.kind == OverloadKind::EnumerateChained {
        format!(
            "        structures.resize( {count_name} );\n        {vec_name}.resize( {count_name} );\n        for ( uint32_t i = 0; i < {count_name}; i++ )\n        {{\n          structures[i].pNext = {vec_name}[i].template get<typename std::remove_reference<decltype( {vec_name}[i].template get<X>() )>::type>().pNext;\n        }}\n"
        )
    } else {
        format!("        {vec_name}.resize( {count_name} );\n")
    }
}

/// After a chained enumerate the plain structs are copied back into their
/// chains.
fn chain_relink_lines(overload: &Overload, vec_name: &str, count_name: &str) -> String {
    if overload.kind == OverloadKind::EnumerateChained {
        format!(
            "    for ( uint32_t i = 0; i < {count_name}; i++ )\n    {{\n      {vec_name}[i].template get<X>() = structures[i];\n    }}\n"
        )
    } else {
        String::new()
    }
}

fn result_check(ctx: &CommandContext) -> String {
    let method = names::cpp_command_name(ctx.c_name);
    let scope = if ctx.has_handle() {
        format!("::{}::", ctx.handle_cpp())
    } else {
        "::".to_string()
    };
    if ctx.multi_success() {
        let codes = ctx
            .cmd
            .success_codes
            .iter()
            .filter_map(|c| {
                ctx.reg
                    .enums
                    .get("VkResult")
                    .and_then(|e| e.resolve_alias(c))
                    .map(|v| format!("Result::{}", v.cpp_name))
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "    resultCheck( result, VULKAN_HPP_NAMESPACE_STRING \"{scope}{method}\", {{ {codes} }} );\n"
        )
    } else {
        format!(
            "    resultCheck( result, VULKAN_HPP_NAMESPACE_STRING \"{scope}{method}\" );\n"
        )
    }
}
