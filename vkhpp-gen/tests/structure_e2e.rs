//! Structure, union and hash emission over the fixture registry.

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
fn buffer_create_info_carries_stype() {
    assert!(HEADER.contains("struct BufferCreateInfo"));
    assert!(HEADER.contains("structureType = StructureType::eBufferCreateInfo"));
    assert!(HEADER.contains("StructureType sType = StructureType::eBufferCreateInfo;"));
    assert!(HEADER.contains("const void * pNext = nullptr;"));
}

#[test]
fn setters_return_self_for_chaining() {
    assert!(HEADER.contains("BufferCreateInfo & setSize("));
    assert!(HEADER.contains("BufferCreateInfo & setPQueueFamilyIndices("));
    assert!(!HEADER.contains("setSType("));
}

#[test]
fn proxy_constructor_computes_counts() {
    assert!(HEADER.contains("ArrayProxyNoTemporaries<const uint32_t> const & pQueueFamilyIndices_"));
    assert!(HEADER.contains(
        "queueFamilyIndexCount{ static_cast<uint32_t>( pQueueFamilyIndices_.size() ) }"
    ));
    // Double pointers keep the inner const.
    assert!(HEADER.contains("ArrayProxyNoTemporaries<const char * const> const & ppEnabledExtensionNames_"));
}

#[test]
fn returned_only_struct_has_no_setters() {
    assert!(HEADER.contains("struct ExtensionProperties"));
    assert!(!HEADER.contains("setSpecVersion("));
    assert!(HEADER.contains("ArrayWrapper1D<char, VK_MAX_EXTENSION_NAME_SIZE>"));
}

#[test]
fn conversions_and_equality() {
    assert!(HEADER.contains("operator VkBufferCreateInfo const &() const VULKAN_HPP_NOEXCEPT"));
    assert!(HEADER.contains("operator VkBufferCreateInfo &() VULKAN_HPP_NOEXCEPT"));
    assert!(HEADER.contains("auto operator<=>( BufferCreateInfo const & ) const = default;"));
    // Byte-compare for fixed arrays.
    assert!(HEADER.contains("memcmp( &extensionName, &rhs.extensionName, sizeof( extensionName ) )"));
}

#[test]
fn union_has_member_constructors_and_no_equality() {
    assert!(HEADER.contains("union ClearColorValue"));
    assert!(HEADER.contains("setFloat32("));
    assert!(HEADER.contains("float float32[4];"));
    let definition = HEADER
        .find("union ClearColorValue\n")
        .expect("union definition present");
    let union_body = &HEADER[definition..];
    let union_body = &union_body[..union_body.find("};").unwrap()];
    assert!(!union_body.contains("operator=="));
}

#[test]
fn struct_static_asserts_match_c_layout() {
    assert!(HEADER.contains(
        "sizeof( VULKAN_HPP_NAMESPACE::BufferCreateInfo ) == sizeof( VkBufferCreateInfo )"
    ));
    assert!(HEADER.contains("std::is_standard_layout<VULKAN_HPP_NAMESPACE::BufferCreateInfo>::value"));
}

#[test]
fn hashes_cover_every_handle() {
    for ty in ["Instance", "PhysicalDevice", "Device", "Buffer"] {
        assert!(
            HEADER.contains(&format!("struct hash<VULKAN_HPP_NAMESPACE::{ty}>")),
            "missing hash for {ty}"
        );
    }
    assert!(HEADER.contains("std::hash<VkBuffer>{}( static_cast<VkBuffer>( buffer ) )"));
}

#[test]
fn to_string_functions_present() {
    assert!(HEADER.contains("to_string( Result value )"));
    assert!(HEADER.contains("case Result::eSuccess: return \"Success\";"));
    assert!(HEADER.contains("to_string( BufferCreateFlags value )"));
    assert!(HEADER.contains("\"SparseBinding | \""));
}

#[test]
fn index_type_traits_map_to_integers() {
    assert!(HEADER.contains("struct CppType<IndexType, IndexType::eUint16>"));
    assert!(HEADER.contains("using Type = uint16_t;"));
    assert!(HEADER.contains("struct IndexTypeValue<uint32_t>"));
}
