//! End-to-end generation test: parse the fixture registry, emit the header,
//! and verify the wrapped entities come out as expected.

use std::path::Path;
use std::sync::LazyLock;

use vkhpp_gen::config::Config;

static HEADER: LazyLock<String> = LazyLock::new(|| {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mini_vk.xml");
    vkhpp_gen::generate(&path, &Config::default())
        .expect("generate mini_vk header")
        .header
});

#[test]
fn header_starts_with_license_and_guard() {
    assert!(
        HEADER.starts_with("// Copyright 2015-2026 The Khronos Group Inc."),
        "license header missing: {}",
        &HEADER[..200.min(HEADER.len())]
    );
    assert!(HEADER.contains("#ifndef VULKAN_HPP\n#define VULKAN_HPP"));
    assert!(HEADER.trim_end().ends_with("#endif  // VULKAN_HPP"));
    assert!(HEADER.contains("static_assert( VK_HEADER_VERSION == 290"));
}

#[test]
fn buffer_handle_is_wrapped() {
    assert!(HEADER.contains("class Buffer"), "Buffer class missing");
    assert!(HEADER.contains("objectType = ObjectType::eBuffer"));
    assert!(HEADER.contains(
        "VULKAN_HPP_STATIC_ASSERT( sizeof( VULKAN_HPP_NAMESPACE::Buffer ) == sizeof( VkBuffer )"
    ));
    assert!(HEADER.contains(
        "struct CppType<VULKAN_HPP_NAMESPACE::ObjectType, VULKAN_HPP_NAMESPACE::ObjectType::eBuffer>"
    ));
    assert!(HEADER.contains("using Type = VULKAN_HPP_NAMESPACE::Buffer;"));
}

#[test]
fn result_enum_has_success_value() {
    assert!(HEADER.contains("enum class Result"));
    assert!(HEADER.contains("eSuccess = VK_SUCCESS"));
    assert!(HEADER.contains("eErrorOutOfHostMemory = VK_ERROR_OUT_OF_HOST_MEMORY"));
    assert!(HEADER.contains("eIncomplete = VK_INCOMPLETE"));
}

#[test]
fn bitmask_values_and_operators() {
    assert!(HEADER.contains("eSparseBinding = VK_BUFFER_CREATE_SPARSE_BINDING_BIT"));
    assert!(HEADER.contains("using BufferCreateFlags = Flags<BufferCreateFlagBits>;"));
    assert!(HEADER.contains(
        "BufferCreateFlags operator|( BufferCreateFlagBits bit0, BufferCreateFlagBits bit1 )"
    ));
    assert!(HEADER.contains(
        "BufferCreateFlagBits::eSparseBinding | BufferCreateFlagBits::eSparseResidency"
    ));
}

#[test]
fn create_buffer_emits_standard_enhanced_and_unique() {
    // Declaration inside the Device class plus out-of-line definitions.
    assert!(HEADER.contains("Result Device::createBuffer("));
    assert!(HEADER.contains("typename ResultValueType<Buffer>::type Device::createBuffer("));
    assert!(HEADER.contains("Device::createBufferUnique("));
    assert!(HEADER.contains("UniqueHandle<Buffer, Dispatch>"));
    assert!(HEADER.contains("d.vkCreateBuffer( m_device,"));
    assert!(HEADER.contains("reinterpret_cast<VkBuffer *>( &buffer )"));
}

#[test]
fn destroy_family_gets_shortened_names() {
    assert!(HEADER.contains("void Device::destroyBuffer("));
    assert!(HEADER.contains("void Device::destroy("));
    assert!(HEADER.contains("Optional<const AllocationCallbacks>"));
}

#[test]
fn free_functions_live_at_namespace_scope() {
    assert!(HEADER.contains("createInstance("));
    assert!(HEADER.contains("createInstanceUnique("));
    // Free definitions carry no class scope.
    assert!(HEADER.contains("typename ResultValueType<Instance>::type createInstance("));
    assert!(HEADER.contains("ObjectDestroy<NoParent, Dispatch> deleter( allocator, d );"));
}

#[test]
fn struct_extends_specialization_present() {
    assert!(HEADER.contains(
        "struct StructExtends<PhysicalDeviceMemoryBudgetPropertiesEXT, PhysicalDeviceMemoryProperties2>"
    ));
    assert!(HEADER.contains("value = true"));
}

#[test]
fn unique_aliases_for_deletable_handles() {
    assert!(HEADER.contains("using UniqueBuffer = UniqueHandle<Buffer, VULKAN_HPP_DEFAULT_DISPATCHER_TYPE>;"));
    assert!(HEADER.contains("using UniqueInstance = UniqueHandle<Instance, VULKAN_HPP_DEFAULT_DISPATCHER_TYPE>;"));
    assert!(HEADER.contains("using deleter = ObjectDestroy<Device, Dispatch>;"));
    assert!(HEADER.contains("using deleter = ObjectDestroy<NoParent, Dispatch>;"));
}

#[test]
fn disabled_extension_leaves_no_trace() {
    assert!(!HEADER.contains("DISABLED_EXAMPLE"));
    assert!(!HEADER.contains("VK_TEST_disabled_example"));
}

#[test]
fn no_residual_template_placeholders() {
    assert!(
        !vkhpp_gen::template::has_residual_placeholder(&HEADER),
        "unsubstituted ${{...}} token left in header"
    );
}

#[test]
fn generation_is_idempotent() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mini_vk.xml");
    let again = vkhpp_gen::generate(&path, &Config::default())
        .expect("second generation")
        .header;
    assert_eq!(*HEADER, again, "two runs over identical input must match");
}

#[test]
fn no_shape_misses_on_fixture() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mini_vk.xml");
    let out = vkhpp_gen::generate(&path, &Config::default()).expect("generate");
    assert_eq!(out.shape_misses, 0, "every fixture command should match a shape");
}
