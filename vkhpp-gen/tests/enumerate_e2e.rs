//! Enumerate-shaped commands: the two-step size-then-fill loop, trimming,
//! and the dispatch loaders that carry the entry points.

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
fn enumerate_returns_a_vector() {
    assert!(HEADER.contains("std::vector<ExtensionProperties, ExtensionPropertiesAllocator>"));
    assert!(HEADER.contains("PhysicalDevice::enumerateDeviceExtensionProperties("));
    assert!(HEADER.contains("std::vector<PhysicalDevice, PhysicalDeviceAllocator>"));
}

#[test]
fn enumerate_loops_until_complete() {
    assert!(HEADER.contains("} while ( result == Result::eIncomplete );"));
    assert!(HEADER.contains("if ( ( result == Result::eSuccess ) && propertyCount )"));
    assert!(HEADER.contains("properties.resize( propertyCount );"));
}

#[test]
fn enumerate_trims_to_written_count() {
    assert!(HEADER.contains("VULKAN_HPP_ASSERT( propertyCount <= properties.size() );"));
    assert!(HEADER.contains("if ( propertyCount < properties.size() )"));
}

#[test]
fn enumerate_queries_with_null_first() {
    assert!(HEADER.contains("d.vkEnumerateDeviceExtensionProperties( m_physicalDevice, &propertyCount, nullptr )"));
    assert!(HEADER.contains(
        "d.vkEnumerateDeviceExtensionProperties( m_physicalDevice, &propertyCount, reinterpret_cast<VkExtensionProperties *>( properties.data() ) )"
    ));
}

#[test]
fn chained_overload_uses_structure_chain() {
    assert!(HEADER.contains("StructureChain<X, Y, Z...>"));
    assert!(HEADER.contains("structureChain.template get<PhysicalDeviceMemoryProperties2>()"));
    assert!(HEADER.contains("PhysicalDevice::getPhysicalDeviceMemoryProperties2("));
}

#[test]
fn static_dispatch_forwards_every_command() {
    assert!(HEADER.contains("class DispatchLoaderStatic"));
    assert!(HEADER.contains("return ::vkCreateBuffer( device, pCreateInfo, pAllocator, pBuffer );"));
    assert!(HEADER.contains("::vkDestroyBuffer( device, buffer, pAllocator );"));
}

#[test]
fn dynamic_dispatch_has_three_phases_and_alias_fallback() {
    assert!(HEADER.contains("class DispatchLoaderDynamic"));
    assert!(HEADER.contains("vkGetInstanceProcAddr( NULL, \"vkCreateInstance\" )"));
    assert!(HEADER.contains("void init( VkInstance instance )"));
    assert!(HEADER.contains("void init( VkDevice device )"));
    assert!(HEADER.contains("vkGetDeviceProcAddr( device, \"vkCreateBuffer\" )"));
    // The KHR alias backfills the promoted entry point.
    assert!(HEADER.contains("PFN_vkGetPhysicalDeviceMemoryProperties2KHR vkGetPhysicalDeviceMemoryProperties2KHR = 0;"));
    assert!(HEADER.contains("if ( !vkGetPhysicalDeviceMemoryProperties2 )"));
}

#[test]
fn alias_commands_surface_in_the_wrapper() {
    assert!(HEADER.contains("getPhysicalDeviceMemoryProperties2KHR("));
}
