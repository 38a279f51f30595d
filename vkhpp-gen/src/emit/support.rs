//! Support emission: the header prelude, base types, index-type traits, the
//! exception hierarchy, structure-chain validation, dispatch loaders and the
//! hash block.

use crate::config::Config;
use crate::model::{CommandData, Registry};
use crate::names;
use crate::template::Template;

/// Include guard, includes, version check, macro knobs and the support
/// templates every generated entity leans on.
pub fn emit_prelude(reg: &Registry, cfg: &Config) -> String {
    let version_check = if reg.version.is_empty() {
        String::new()
    } else {
        format!(
            "static_assert( VK_HEADER_VERSION == {}, \"Wrong VK_HEADER_VERSION!\" );\n",
            reg.version
        )
    };
    let typesafe = if reg.typesafe_check.is_empty() {
        String::new()
    } else {
        format!(
            "// 32-bit ABIs collapse non-dispatchable handles to uint64_t; only 64-bit\n// targets get distinct wrapper types by default.\n{}\n#  if !defined( VULKAN_HPP_TYPESAFE_CONVERSION )\n#    define VULKAN_HPP_TYPESAFE_CONVERSION\n#  endif\n#endif\n",
            reg.typesafe_check
        )
    };

    Template::new(
        r#"#ifndef ${guard}
#define ${guard}

#include <algorithm>
#include <array>
#include <cassert>
#include <cstdint>
#include <cstdio>
#include <cstring>
#include <functional>
#include <memory>
#include <string>
#include <system_error>
#include <tuple>
#include <type_traits>
#include <utility>
#include <vector>
#include <vulkan/vulkan.h>

${version_check}
#if !defined( VULKAN_HPP_NAMESPACE )
#  define VULKAN_HPP_NAMESPACE ${namespace}
#endif
#define VULKAN_HPP_STRINGIFY2( text ) #text
#define VULKAN_HPP_STRINGIFY( text )  VULKAN_HPP_STRINGIFY2( text )
#define VULKAN_HPP_NAMESPACE_STRING   VULKAN_HPP_STRINGIFY( VULKAN_HPP_NAMESPACE )

#if !defined( VULKAN_HPP_ASSERT )
#  define VULKAN_HPP_ASSERT assert
#endif
#if !defined( VULKAN_HPP_ASSERT_ON_RESULT )
#  define VULKAN_HPP_ASSERT_ON_RESULT VULKAN_HPP_ASSERT
#endif
#if !defined( VULKAN_HPP_INLINE )
#  define VULKAN_HPP_INLINE inline
#endif
#define VULKAN_HPP_NOEXCEPT             noexcept
#define VULKAN_HPP_NODISCARD            [[nodiscard]]
#define VULKAN_HPP_CONSTEXPR            constexpr
#define VULKAN_HPP_CONSTEXPR_14         constexpr
#define VULKAN_HPP_CONST_OR_CONSTEXPR   constexpr
#define VULKAN_HPP_DEPRECATED( msg )    [[deprecated( msg )]]
#if 201907 <= __cpp_lib_three_way_comparison
#  define VULKAN_HPP_HAS_SPACESHIP_OPERATOR
#  include <compare>
#endif
#define VULKAN_HPP_STATIC_ASSERT        static_assert
#if !defined( VULKAN_HPP_DEFAULT_DISPATCHER )
#  define VULKAN_HPP_DEFAULT_DISPATCHER VULKAN_HPP_NAMESPACE::getDispatchLoaderStatic()
#  define VULKAN_HPP_DEFAULT_DISPATCHER_TYPE VULKAN_HPP_NAMESPACE::DispatchLoaderStatic
#endif
#define VULKAN_HPP_DEFAULT_DISPATCHER_ASSIGNMENT    = VULKAN_HPP_DEFAULT_DISPATCHER
#define VULKAN_HPP_DEFAULT_ARGUMENT_NULLPTR_ASSIGNMENT = nullptr
#if defined( VULKAN_HPP_DISABLE_ENHANCED_MODE ) && !defined( VULKAN_HPP_NO_SMART_HANDLE )
#  define VULKAN_HPP_NO_SMART_HANDLE
#endif

#if ( VK_USE_64_BIT_PTR_DEFINES == 1 )
#  define VULKAN_HPP_TYPESAFE_EXPLICIT explicit
${typesafe}#else
#  define VULKAN_HPP_TYPESAFE_EXPLICIT
#endif

namespace VULKAN_HPP_NAMESPACE
{
  template <typename T, size_t N>
  class ArrayWrapper1D : public std::array<T, N>
  {
  public:
    VULKAN_HPP_CONSTEXPR ArrayWrapper1D() VULKAN_HPP_NOEXCEPT : std::array<T, N>() {}
    VULKAN_HPP_CONSTEXPR ArrayWrapper1D( std::array<T, N> const & data ) VULKAN_HPP_NOEXCEPT : std::array<T, N>( data ) {}

    operator T const *() const VULKAN_HPP_NOEXCEPT
    {
      return this->data();
    }

    operator T *() VULKAN_HPP_NOEXCEPT
    {
      return this->data();
    }
  };

  template <typename T, size_t N, size_t M>
  class ArrayWrapper2D : public std::array<ArrayWrapper1D<T, M>, N>
  {
  public:
    VULKAN_HPP_CONSTEXPR ArrayWrapper2D() VULKAN_HPP_NOEXCEPT : std::array<ArrayWrapper1D<T, M>, N>() {}
  };

  template <typename FlagBitsType>
  struct FlagTraits
  {
    static VULKAN_HPP_CONST_OR_CONSTEXPR bool isBitmask = false;
  };

  template <typename BitType>
  class Flags
  {
  public:
    using MaskType = typename std::underlying_type<BitType>::type;

    VULKAN_HPP_CONSTEXPR Flags() VULKAN_HPP_NOEXCEPT : m_mask( 0 ) {}
    VULKAN_HPP_CONSTEXPR Flags( BitType bit ) VULKAN_HPP_NOEXCEPT : m_mask( static_cast<MaskType>( bit ) ) {}
    VULKAN_HPP_CONSTEXPR Flags( Flags<BitType> const & rhs ) VULKAN_HPP_NOEXCEPT = default;
    VULKAN_HPP_CONSTEXPR explicit Flags( MaskType flags ) VULKAN_HPP_NOEXCEPT : m_mask( flags ) {}

    VULKAN_HPP_CONSTEXPR Flags<BitType> operator&( Flags<BitType> const & rhs ) const VULKAN_HPP_NOEXCEPT
    {
      return Flags<BitType>( m_mask & rhs.m_mask );
    }

    VULKAN_HPP_CONSTEXPR Flags<BitType> operator|( Flags<BitType> const & rhs ) const VULKAN_HPP_NOEXCEPT
    {
      return Flags<BitType>( m_mask | rhs.m_mask );
    }

    VULKAN_HPP_CONSTEXPR Flags<BitType> operator^( Flags<BitType> const & rhs ) const VULKAN_HPP_NOEXCEPT
    {
      return Flags<BitType>( m_mask ^ rhs.m_mask );
    }

    VULKAN_HPP_CONSTEXPR Flags<BitType> operator~() const VULKAN_HPP_NOEXCEPT
    {
      return Flags<BitType>( m_mask ^ static_cast<MaskType>( FlagTraits<BitType>::allFlags ) );
    }

    VULKAN_HPP_CONSTEXPR bool operator==( Flags<BitType> const & rhs ) const VULKAN_HPP_NOEXCEPT
    {
      return m_mask == rhs.m_mask;
    }

    VULKAN_HPP_CONSTEXPR bool operator!=( Flags<BitType> const & rhs ) const VULKAN_HPP_NOEXCEPT
    {
      return m_mask != rhs.m_mask;
    }

    explicit VULKAN_HPP_CONSTEXPR operator bool() const VULKAN_HPP_NOEXCEPT
    {
      return !!m_mask;
    }

    explicit VULKAN_HPP_CONSTEXPR operator MaskType() const VULKAN_HPP_NOEXCEPT
    {
      return m_mask;
    }

  private:
    MaskType m_mask;
  };

  template <typename T>
  class ArrayProxy
  {
  public:
    VULKAN_HPP_CONSTEXPR ArrayProxy() VULKAN_HPP_NOEXCEPT : m_count( 0 ), m_ptr( nullptr ) {}
    VULKAN_HPP_CONSTEXPR ArrayProxy( std::nullptr_t ) VULKAN_HPP_NOEXCEPT : m_count( 0 ), m_ptr( nullptr ) {}
    ArrayProxy( T const & value ) VULKAN_HPP_NOEXCEPT : m_count( 1 ), m_ptr( &value ) {}
    ArrayProxy( uint32_t count, T const * ptr ) VULKAN_HPP_NOEXCEPT : m_count( count ), m_ptr( ptr ) {}
    template <typename A>
    ArrayProxy( std::vector<typename std::remove_const<T>::type, A> const & data ) VULKAN_HPP_NOEXCEPT
      : m_count( static_cast<uint32_t>( data.size() ) ), m_ptr( data.data() )
    {
    }
    ArrayProxy( std::initializer_list<typename std::remove_const<T>::type> const & list ) VULKAN_HPP_NOEXCEPT
      : m_count( static_cast<uint32_t>( list.size() ) ), m_ptr( list.begin() )
    {
    }

    uint32_t size() const VULKAN_HPP_NOEXCEPT
    {
      return m_count;
    }

    T const * data() const VULKAN_HPP_NOEXCEPT
    {
      return m_ptr;
    }

  private:
    uint32_t  m_count;
    T const * m_ptr;
  };

  template <typename T>
  class ArrayProxyNoTemporaries
  {
  public:
    VULKAN_HPP_CONSTEXPR ArrayProxyNoTemporaries() VULKAN_HPP_NOEXCEPT : m_count( 0 ), m_ptr( nullptr ) {}
    VULKAN_HPP_CONSTEXPR ArrayProxyNoTemporaries( std::nullptr_t ) VULKAN_HPP_NOEXCEPT : m_count( 0 ), m_ptr( nullptr ) {}
    ArrayProxyNoTemporaries( T & value ) VULKAN_HPP_NOEXCEPT : m_count( 1 ), m_ptr( &value ) {}
    template <typename V>
    ArrayProxyNoTemporaries( V && value ) = delete;
    template <typename A>
    ArrayProxyNoTemporaries( std::vector<typename std::remove_const<T>::type, A> & data ) VULKAN_HPP_NOEXCEPT
      : m_count( static_cast<uint32_t>( data.size() ) ), m_ptr( data.data() )
    {
    }

    uint32_t size() const VULKAN_HPP_NOEXCEPT
    {
      return m_count;
    }

    T * data() const VULKAN_HPP_NOEXCEPT
    {
      return m_ptr;
    }

  private:
    uint32_t m_count;
    T *      m_ptr;
  };

  template <typename RefType>
  class Optional
  {
  public:
    Optional( RefType & reference ) VULKAN_HPP_NOEXCEPT : m_ptr( &reference ) {}
    Optional( RefType * ptr ) VULKAN_HPP_NOEXCEPT : m_ptr( ptr ) {}
    Optional( std::nullptr_t ) VULKAN_HPP_NOEXCEPT : m_ptr( nullptr ) {}

    operator RefType *() const VULKAN_HPP_NOEXCEPT
    {
      return m_ptr;
    }

    RefType const * operator->() const VULKAN_HPP_NOEXCEPT
    {
      return m_ptr;
    }

    explicit operator bool() const VULKAN_HPP_NOEXCEPT
    {
      return !!m_ptr;
    }

  private:
    RefType * m_ptr;
  };

  template <typename X, typename Y>
  struct StructExtends
  {
    enum
    {
      value = false
    };
  };

  template <typename... ChainElements>
  class StructureChain : public std::tuple<ChainElements...>
  {
  public:
    StructureChain() VULKAN_HPP_NOEXCEPT
    {
      static_assert( 1 < sizeof...( ChainElements ), "a structure chain needs at least two elements" );
      link<sizeof...( ChainElements ) - 1>();
    }

    template <typename T = typename std::tuple_element<0, std::tuple<ChainElements...>>::type, size_t Which = 0>
    T & get() VULKAN_HPP_NOEXCEPT
    {
      return std::get<Which>( static_cast<std::tuple<ChainElements...> &>( *this ) );
    }

    template <typename T = typename std::tuple_element<0, std::tuple<ChainElements...>>::type, size_t Which = 0>
    T const & get() const VULKAN_HPP_NOEXCEPT
    {
      return std::get<Which>( static_cast<std::tuple<ChainElements...> const &>( *this ) );
    }

  private:
    template <size_t Index>
    typename std::enable_if<Index != 0, void>::type link() VULKAN_HPP_NOEXCEPT
    {
      auto & x = std::get<Index - 1>( static_cast<std::tuple<ChainElements...> &>( *this ) );
      x.pNext  = &std::get<Index>( static_cast<std::tuple<ChainElements...> &>( *this ) );
      link<Index - 1>();
    }

    template <size_t Index>
    typename std::enable_if<Index == 0, void>::type link() VULKAN_HPP_NOEXCEPT
    {
    }
  };

  class NoParent;
  struct AllocationCallbacks;

  template <typename Type, typename Dispatch>
  class UniqueHandleTraits;

  template <typename Type, typename Dispatch>
  class UniqueHandle : public UniqueHandleTraits<Type, Dispatch>::deleter
  {
  private:
    using Deleter = typename UniqueHandleTraits<Type, Dispatch>::deleter;

  public:
    UniqueHandle() : Deleter(), m_value() {}

    explicit UniqueHandle( Type const & value, Deleter const & deleter = Deleter() ) VULKAN_HPP_NOEXCEPT
      : Deleter( deleter ), m_value( value )
    {
    }

    UniqueHandle( UniqueHandle const & ) = delete;

    UniqueHandle( UniqueHandle && other ) VULKAN_HPP_NOEXCEPT
      : Deleter( std::move( static_cast<Deleter &>( other ) ) ), m_value( other.release() )
    {
    }

    ~UniqueHandle() VULKAN_HPP_NOEXCEPT
    {
      if ( m_value )
      {
        this->destroy( m_value );
      }
    }

    UniqueHandle & operator=( UniqueHandle const & ) = delete;

    UniqueHandle & operator=( UniqueHandle && other ) VULKAN_HPP_NOEXCEPT
    {
      reset( other.release() );
      *static_cast<Deleter *>( this ) = std::move( static_cast<Deleter &>( other ) );
      return *this;
    }

    explicit operator bool() const VULKAN_HPP_NOEXCEPT
    {
      return m_value.operator bool();
    }

    Type const * operator->() const VULKAN_HPP_NOEXCEPT
    {
      return &m_value;
    }

    Type const & operator*() const VULKAN_HPP_NOEXCEPT
    {
      return m_value;
    }

    const Type & get() const VULKAN_HPP_NOEXCEPT
    {
      return m_value;
    }

    void reset( Type const & value = Type() ) VULKAN_HPP_NOEXCEPT
    {
      if ( m_value != value )
      {
        if ( m_value )
        {
          this->destroy( m_value );
        }
        m_value = value;
      }
    }

    Type release() VULKAN_HPP_NOEXCEPT
    {
      Type value = m_value;
      m_value    = nullptr;
      return value;
    }

  private:
    Type m_value;
  };

  template <typename OwnerType, typename Dispatch>
  class ObjectDestroy
  {
  public:
    ObjectDestroy() = default;

    ObjectDestroy( OwnerType owner,
                   Optional<const AllocationCallbacks> allocationCallbacks VULKAN_HPP_DEFAULT_ARGUMENT_NULLPTR_ASSIGNMENT,
                   Dispatch const & dispatch VULKAN_HPP_DEFAULT_DISPATCHER_ASSIGNMENT ) VULKAN_HPP_NOEXCEPT
      : m_owner( owner )
      , m_allocationCallbacks( allocationCallbacks )
      , m_dispatch( &dispatch )
    {
    }

    OwnerType getOwner() const VULKAN_HPP_NOEXCEPT
    {
      return m_owner;
    }

  protected:
    template <typename T>
    void destroy( T t ) VULKAN_HPP_NOEXCEPT
    {
      VULKAN_HPP_ASSERT( m_owner && m_dispatch );
      m_owner.destroy( t, m_allocationCallbacks, *m_dispatch );
    }

  private:
    OwnerType                           m_owner               = {};
    Optional<const AllocationCallbacks> m_allocationCallbacks = nullptr;
    Dispatch const *                    m_dispatch            = nullptr;
  };

  template <typename Dispatch>
  class ObjectDestroy<NoParent, Dispatch>
  {
  public:
    ObjectDestroy() = default;

    ObjectDestroy( Optional<const AllocationCallbacks> allocationCallbacks,
                   Dispatch const & dispatch VULKAN_HPP_DEFAULT_DISPATCHER_ASSIGNMENT ) VULKAN_HPP_NOEXCEPT
      : m_allocationCallbacks( allocationCallbacks )
      , m_dispatch( &dispatch )
    {
    }

  protected:
    template <typename T>
    void destroy( T t ) VULKAN_HPP_NOEXCEPT
    {
      VULKAN_HPP_ASSERT( m_dispatch );
      t.destroy( m_allocationCallbacks, *m_dispatch );
    }

  private:
    Optional<const AllocationCallbacks> m_allocationCallbacks = nullptr;
    Dispatch const *                    m_dispatch            = nullptr;
  };

  template <typename OwnerType, typename Dispatch>
  class ObjectFree
  {
  public:
    ObjectFree() = default;

    ObjectFree( OwnerType owner,
                Optional<const AllocationCallbacks> allocationCallbacks VULKAN_HPP_DEFAULT_ARGUMENT_NULLPTR_ASSIGNMENT,
                Dispatch const & dispatch VULKAN_HPP_DEFAULT_DISPATCHER_ASSIGNMENT ) VULKAN_HPP_NOEXCEPT
      : m_owner( owner )
      , m_allocationCallbacks( allocationCallbacks )
      , m_dispatch( &dispatch )
    {
    }

  protected:
    template <typename T>
    void destroy( T t ) VULKAN_HPP_NOEXCEPT
    {
      VULKAN_HPP_ASSERT( m_owner && m_dispatch );
      ( m_owner.free )( t, m_allocationCallbacks, *m_dispatch );
    }

  private:
    OwnerType                           m_owner               = {};
    Optional<const AllocationCallbacks> m_allocationCallbacks = nullptr;
    Dispatch const *                    m_dispatch            = nullptr;
  };

  template <typename OwnerType, typename Dispatch>
  class ObjectRelease
  {
  public:
    ObjectRelease() = default;

    ObjectRelease( OwnerType owner, Dispatch const & dispatch VULKAN_HPP_DEFAULT_DISPATCHER_ASSIGNMENT ) VULKAN_HPP_NOEXCEPT
      : m_owner( owner )
      , m_dispatch( &dispatch )
    {
    }

  protected:
    template <typename T>
    void destroy( T t ) VULKAN_HPP_NOEXCEPT
    {
      VULKAN_HPP_ASSERT( m_owner && m_dispatch );
      m_owner.release( t, *m_dispatch );
    }

  private:
    OwnerType        m_owner    = {};
    Dispatch const * m_dispatch = nullptr;
  };

  template <typename OwnerType, typename PoolType, typename Dispatch>
  class PoolFree
  {
  public:
    PoolFree() = default;

    PoolFree( OwnerType owner, PoolType pool, Dispatch const & dispatch VULKAN_HPP_DEFAULT_DISPATCHER_ASSIGNMENT ) VULKAN_HPP_NOEXCEPT
      : m_owner( owner )
      , m_pool( pool )
      , m_dispatch( &dispatch )
    {
    }

  protected:
    template <typename T>
    void destroy( T t ) VULKAN_HPP_NOEXCEPT
    {
      ( m_owner.free )( m_pool, t, *m_dispatch );
    }

  private:
    OwnerType        m_owner    = {};
    PoolType         m_pool     = {};
    Dispatch const * m_dispatch = nullptr;
  };

  template <typename EnumType, EnumType value>
  struct CppType
  {
  };

  VULKAN_HPP_INLINE std::string toHexString( uint32_t value )
  {
    char buffer[16];
    snprintf( buffer, 16, "%x", value );
    return std::string( buffer );
  }
"#,
    )
    .with("guard", cfg.output.header_macro.as_str())
    .with("namespace", cfg.output.namespace.as_str())
    .with("version_check", version_check)
    .with("typesafe", typesafe)
    .render()
}

/// `using Bool32 = uint32_t;`-style base type aliases. `VkFlags` and
/// `VkFlags64` are covered by the `Flags` template and stay out.
pub fn emit_base_types(reg: &Registry) -> String {
    let mut out = String::from("\n  //=== Base types ===\n\n");
    for (name, data) in &reg.base_types {
        if data.type_info.ty.is_empty() || matches!(name.as_str(), "VkFlags" | "VkFlags64") {
            continue;
        }
        out.push_str(&format!(
            "  using {} = {};\n",
            names::cpp_type_name(name),
            data.type_info.ty
        ));
    }
    out.push('\n');
    out
}

/// `CppType<IndexType, …>` mappings from index enum values to integer types.
pub fn emit_index_type_traits(reg: &Registry) -> String {
    let Some(index_type) = reg.enums.get("VkIndexType") else {
        return String::new();
    };
    let mut out = String::new();
    for value in &index_type.values {
        let int_type = match value.cpp_name.as_str() {
            "eUint8" | "eUint8KHR" | "eUint8EXT" => "uint8_t",
            "eUint16" => "uint16_t",
            "eUint32" => "uint32_t",
            _ => continue,
        };
        out.push_str(
            &Template::new(
                "  template <>\n  struct CppType<IndexType, IndexType::${value}>\n  {\n    using Type = ${int};\n  };\n\n  template <>\n  struct IndexTypeValue<${int}>\n  {\n    static VULKAN_HPP_CONST_OR_CONSTEXPR IndexType value = IndexType::${value};\n  };\n\n",
            )
            .with("value", value.cpp_name.as_str())
            .with("int", int_type)
            .render(),
        );
    }
    format!(
        "  //=== Index type traits ===\n\n  template <typename T>\n  struct IndexTypeValue\n  {{\n  }};\n\n{out}"
    )
}

/// One exception class per `VkResult` error value plus the thrower the
/// result plumbing calls.
pub fn emit_result_exceptions(reg: &Registry) -> String {
    let Some(result) = reg.enums.get("VkResult") else {
        return String::new();
    };
    let errors: Vec<&crate::model::EnumValueData> = result
        .values
        .iter()
        .filter(|v| v.cpp_name.starts_with("eError"))
        .collect();

    let mut out = String::from(
        r#"  //=== Exceptions ===

#if !defined( VULKAN_HPP_NO_EXCEPTIONS )
  class ErrorCategoryImpl : public std::error_category
  {
  public:
    const char * name() const VULKAN_HPP_NOEXCEPT override
    {
      return VULKAN_HPP_NAMESPACE_STRING "::Result";
    }

    std::string message( int ev ) const override
    {
      return to_string( static_cast<Result>( ev ) );
    }
  };

  VULKAN_HPP_INLINE const std::error_category & errorCategory() VULKAN_HPP_NOEXCEPT
  {
    static ErrorCategoryImpl instance;
    return instance;
  }

  VULKAN_HPP_INLINE std::error_code make_error_code( Result e ) VULKAN_HPP_NOEXCEPT
  {
    return std::error_code( static_cast<int>( e ), errorCategory() );
  }

  class Error
  {
  public:
    Error() VULKAN_HPP_NOEXCEPT                = default;
    Error( const Error & ) VULKAN_HPP_NOEXCEPT = default;
    virtual ~Error() VULKAN_HPP_NOEXCEPT       = default;

    virtual const char * what() const VULKAN_HPP_NOEXCEPT = 0;
  };

  class SystemError : public Error, public std::system_error
  {
  public:
    SystemError( std::error_code ec ) : Error(), std::system_error( ec ) {}
    SystemError( std::error_code ec, std::string const & what ) : Error(), std::system_error( ec, what ) {}

    virtual const char * what() const VULKAN_HPP_NOEXCEPT
    {
      return std::system_error::what();
    }
  };

"#,
    );

    for error in &errors {
        // eErrorOutOfHostMemory → OutOfHostMemoryError
        let class_name = format!("{}Error", &error.cpp_name["eError".len()..]);
        out.push_str(
            &Template::new(
                "  class ${class} : public SystemError\n  {\n  public:\n    ${class}( std::string const & message ) : SystemError( make_error_code( Result::${value} ), message ) {}\n    ${class}( char const * message ) : SystemError( make_error_code( Result::${value} ), message ) {}\n  };\n\n",
            )
            .with("class", class_name)
            .with("value", error.cpp_name.as_str())
            .render(),
        );
    }

    out.push_str("  namespace detail\n  {\n    [[noreturn]] VULKAN_HPP_INLINE void throwResultException( Result result, char const * message )\n    {\n      switch ( result )\n      {\n");
    for error in &errors {
        let class_name = format!("{}Error", &error.cpp_name["eError".len()..]);
        out.push_str(&format!(
            "        case Result::{}: throw {class_name}( message );\n",
            error.cpp_name
        ));
    }
    out.push_str("        default: throw SystemError( make_error_code( result ), message );\n      }\n    }\n  }  // namespace detail\n#endif\n\n");

    out.push_str(
        r#"  template <typename T>
  struct ResultValue
  {
    ResultValue( Result r, T & v ) : result( r ), value( v ) {}
    ResultValue( Result r, T && v ) : result( r ), value( std::move( v ) ) {}

    Result result;
    T      value;

    operator std::tuple<Result &, T &>() VULKAN_HPP_NOEXCEPT
    {
      return std::tuple<Result &, T &>( result, value );
    }
  };

  template <typename T>
  struct ResultValueType
  {
#ifdef VULKAN_HPP_NO_EXCEPTIONS
    using type = ResultValue<T>;
#else
    using type = T;
#endif
  };

  template <>
  struct ResultValueType<void>
  {
#ifdef VULKAN_HPP_NO_EXCEPTIONS
    using type = Result;
#else
    using type = void;
#endif
  };

  VULKAN_HPP_INLINE typename ResultValueType<void>::type createResultValueType( Result result )
  {
#ifdef VULKAN_HPP_NO_EXCEPTIONS
    return result;
#else
    ( void )result;
#endif
  }

  template <typename T>
  VULKAN_HPP_INLINE typename ResultValueType<T>::type createResultValueType( Result result, T & data )
  {
#ifdef VULKAN_HPP_NO_EXCEPTIONS
    return ResultValue<T>( result, data );
#else
    ( void )result;
    return data;
#endif
  }

  template <typename T>
  VULKAN_HPP_INLINE typename ResultValueType<T>::type createResultValueType( Result result, T && data )
  {
#ifdef VULKAN_HPP_NO_EXCEPTIONS
    return ResultValue<T>( result, std::move( data ) );
#else
    ( void )result;
    return std::move( data );
#endif
  }

  VULKAN_HPP_INLINE void resultCheck( Result result, char const * message )
  {
#ifdef VULKAN_HPP_NO_EXCEPTIONS
    VULKAN_HPP_ASSERT_ON_RESULT( result == Result::eSuccess );
    ( void )result;
    ( void )message;
#else
    if ( result != Result::eSuccess )
    {
      detail::throwResultException( result, message );
    }
#endif
  }

  VULKAN_HPP_INLINE void resultCheck( Result result, char const * message, std::initializer_list<Result> successCodes )
  {
#ifdef VULKAN_HPP_NO_EXCEPTIONS
    VULKAN_HPP_ASSERT_ON_RESULT( std::find( successCodes.begin(), successCodes.end(), result ) != successCodes.end() );
    ( void )result;
    ( void )message;
    ( void )successCodes;
#else
    if ( std::find( successCodes.begin(), successCodes.end(), result ) == successCodes.end() )
    {
      detail::throwResultException( result, message );
    }
#endif
  }

"#,
    );
    out
}

/// `StructExtends<S, T>` edges of the pNext DAG.
pub fn emit_struct_extends(reg: &Registry) -> String {
    let mut out = String::from("  //=== Structure chain validation ===\n\n");
    for (name, data) in &reg.structs {
        if data.struct_extends.is_empty() {
            continue;
        }
        let mut block = String::new();
        for target in &data.struct_extends {
            block.push_str(
                &Template::new(
                    "  template <>\n  struct StructExtends<${s}, ${t}>\n  {\n    enum\n    {\n      value = true\n    };\n  };\n\n",
                )
                .with("s", names::cpp_type_name(name))
                .with("t", names::cpp_type_name(target))
                .render(),
            );
        }
        out.push_str(&wrap_type_protect(reg, name, block));
    }
    out
}

/// Where a command's entry point is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchLevel {
    Global,
    Instance,
    Device,
}

fn dispatch_level(reg: &Registry, cmd: &CommandData) -> DispatchLevel {
    if cmd.handle.is_empty() {
        return DispatchLevel::Global;
    }
    // A command is device-level iff its first parameter's handle chain roots
    // at the device rather than the instance.
    let mut current = cmd.handle.clone();
    for _ in 0..8 {
        if current == "VkDevice" {
            return DispatchLevel::Device;
        }
        if current == "VkInstance" || current == "VkPhysicalDevice" {
            return DispatchLevel::Instance;
        }
        match reg
            .handles
            .get(&current)
            .and_then(|h| h.parents.first().cloned())
        {
            Some(parent) => current = parent,
            None => break,
        }
    }
    DispatchLevel::Instance
}

/// The static dispatcher: one thin forwarder per command and alias.
pub fn emit_dispatch_static(reg: &Registry) -> String {
    let mut out = String::from("  //=== Dispatch loaders ===\n\n  class DispatchLoaderStatic\n  {\n  public:\n");
    for (name, cmd) in &reg.commands {
        let mut block = String::new();
        block.push_str(&static_forwarder(name, cmd));
        for alias in cmd.aliases.keys() {
            block.push_str(&static_forwarder(alias, cmd));
        }
        out.push_str(&wrap_command_protect(reg, cmd, block));
    }
    out.push_str("  };\n\n  VULKAN_HPP_INLINE DispatchLoaderStatic & getDispatchLoaderStatic()\n  {\n    static DispatchLoaderStatic dls;\n    return dls;\n  }\n\n");
    out
}

fn static_forwarder(name: &str, cmd: &CommandData) -> String {
    let params: Vec<String> = cmd
        .params
        .iter()
        .map(|p| {
            let mut decl = format!("{} {}", p.type_info.compose_c(), p.name);
            for size in &p.array_sizes {
                decl.push_str(&format!("[{size}]"));
            }
            decl
        })
        .collect();
    let args: Vec<&str> = cmd.params.iter().map(|p| p.name.as_str()).collect();
    let ret = if cmd.return_type == "void" {
        String::new()
    } else {
        "return ".to_string()
    };
    format!(
        "    {} {name}( {} ) const VULKAN_HPP_NOEXCEPT\n    {{\n      {ret}::{name}( {} );\n    }}\n\n",
        cmd.return_type,
        params.join(", "),
        args.join(", ")
    )
}

/// The dynamic dispatcher: a function-pointer table initialized in three
/// phases (global → instance → device), with alias fallback when the primary
/// name does not resolve.
pub fn emit_dispatch_dynamic(reg: &Registry) -> String {
    let mut out = String::from("  class DispatchLoaderDynamic\n  {\n  public:\n");

    // The two proc-addr entry points get dedicated members below.
    let is_proc_addr = |name: &str| {
        name == "vkGetInstanceProcAddr" || name == "vkGetDeviceProcAddr"
    };
    for (name, cmd) in &reg.commands {
        if is_proc_addr(name) {
            continue;
        }
        let mut block = format!("    PFN_{name} {name} = 0;\n");
        for alias in cmd.aliases.keys() {
            block.push_str(&format!("    PFN_{alias} {alias} = 0;\n"));
        }
        out.push_str(&wrap_command_protect(reg, cmd, block));
    }

    out.push_str(
        r#"
    PFN_vkGetInstanceProcAddr vkGetInstanceProcAddr = 0;
    PFN_vkGetDeviceProcAddr   vkGetDeviceProcAddr   = 0;

  public:
    DispatchLoaderDynamic() VULKAN_HPP_NOEXCEPT = default;

    DispatchLoaderDynamic( PFN_vkGetInstanceProcAddr getInstanceProcAddr ) VULKAN_HPP_NOEXCEPT
    {
      init( getInstanceProcAddr );
    }

    void init( PFN_vkGetInstanceProcAddr getInstanceProcAddr ) VULKAN_HPP_NOEXCEPT
    {
      VULKAN_HPP_ASSERT( getInstanceProcAddr );
      vkGetInstanceProcAddr = getInstanceProcAddr;
"#,
    );
    for (name, cmd) in &reg.commands {
        if dispatch_level(reg, cmd) == DispatchLevel::Global {
            let block = format!(
                "      {name} = PFN_{name}( vkGetInstanceProcAddr( NULL, \"{name}\" ) );\n"
            );
            out.push_str(&wrap_command_protect(reg, cmd, block));
        }
    }
    out.push_str("    }\n\n    void init( VkInstance instance ) VULKAN_HPP_NOEXCEPT\n    {\n      VULKAN_HPP_ASSERT( instance && vkGetInstanceProcAddr );\n");
    for (name, cmd) in &reg.commands {
        if dispatch_level(reg, cmd) == DispatchLevel::Global {
            continue;
        }
        let mut block = format!(
            "      {name} = PFN_{name}( vkGetInstanceProcAddr( instance, \"{name}\" ) );\n"
        );
        for alias in cmd.aliases.keys() {
            block.push_str(&format!(
                "      {alias} = PFN_{alias}( vkGetInstanceProcAddr( instance, \"{alias}\" ) );\n"
            ));
            block.push_str(&format!(
                "      if ( !{name} )\n        {name} = PFN_{name}( {alias} );\n"
            ));
        }
        out.push_str(&wrap_command_protect(reg, cmd, block));
    }
    out.push_str("    }\n\n    void init( VkDevice device ) VULKAN_HPP_NOEXCEPT\n    {\n      VULKAN_HPP_ASSERT( device && vkGetDeviceProcAddr );\n");
    for (name, cmd) in &reg.commands {
        if dispatch_level(reg, cmd) != DispatchLevel::Device {
            continue;
        }
        let mut block = format!(
            "      {name} = PFN_{name}( vkGetDeviceProcAddr( device, \"{name}\" ) );\n"
        );
        for alias in cmd.aliases.keys() {
            block.push_str(&format!(
                "      {alias} = PFN_{alias}( vkGetDeviceProcAddr( device, \"{alias}\" ) );\n"
            ));
            block.push_str(&format!(
                "      if ( !{name} )\n        {name} = PFN_{name}( {alias} );\n"
            ));
        }
        out.push_str(&wrap_command_protect(reg, cmd, block));
    }
    out.push_str("    }\n  };\n\n");
    out
}

/// `std::hash` specializations for every handle, emitted outside the main
/// namespace.
pub fn emit_hashes(reg: &Registry) -> String {
    let mut out = String::from("namespace std\n{\n");
    for (name, data) in &reg.handles {
        if name.is_empty() || data.alias.is_some() {
            continue;
        }
        let cpp = names::cpp_type_name(name);
        let arg = names::start_lower_case(&cpp);
        out.push_str(
            &Template::new(
                "  template <>\n  struct hash<VULKAN_HPP_NAMESPACE::${cpp}>\n  {\n    std::size_t operator()( VULKAN_HPP_NAMESPACE::${cpp} const & ${arg} ) const VULKAN_HPP_NOEXCEPT\n    {\n      return std::hash<${c}>{}( static_cast<${c}>( ${arg} ) );\n    }\n  };\n\n",
            )
            .with("cpp", cpp)
            .with("arg", arg)
            .with("c", name)
            .render(),
        );
    }
    out.push_str("}  // namespace std\n");
    out
}

fn wrap_command_protect(reg: &Registry, cmd: &CommandData, text: String) -> String {
    match reg.protect_for_command(cmd) {
        Some(protect) => format!("#if defined( {protect} )\n{text}#endif /* {protect} */\n"),
        None => text,
    }
}

/// The guard macro for a type, via the extension that introduced it.
pub fn wrap_type_protect(reg: &Registry, type_name: &str, text: String) -> String {
    let protect = reg
        .extensions
        .iter()
        .find(|(_, e)| e.types.contains(type_name))
        .and_then(|(name, _)| reg.protect_for_extension(name));
    match protect {
        Some(protect) => format!("#if defined( {protect} )\n{text}#endif /* {protect} */\n\n"),
        None => text,
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
    <platforms>
        <platform name="win32" protect="VK_USE_PLATFORM_WIN32_KHR" comment="win32"/>
    </platforms>
    <types>
        <type name="uint32_t"/>
        <type category="basetype">typedef <type>uint32_t</type> <name>VkBool32</name>;</type>
        <type category="enum" name="VkResult"/>
        <type category="handle" objtypeenum="VK_OBJECT_TYPE_INSTANCE"><type>VK_DEFINE_HANDLE</type>(<name>VkInstance</name>)</type>
        <type category="handle" parent="VkInstance" objtypeenum="VK_OBJECT_TYPE_DEVICE"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
        <type category="handle" parent="VkDevice" objtypeenum="VK_OBJECT_TYPE_QUEUE"><type>VK_DEFINE_HANDLE</type>(<name>VkQueue</name>)</type>
        <type category="struct" name="VkDeviceCreateInfo">
            <member><type>uint32_t</type> <name>flags</name></member>
        </type>
        <type category="struct" name="VkWin32Info">
            <member><type>uint32_t</type> <name>flags</name></member>
        </type>
        <type category="struct" name="VkExtraInfo" structextends="VkDeviceCreateInfo">
            <member><type>uint32_t</type> <name>extra</name></member>
        </type>
    </types>
    <enums name="VkResult" type="enum">
        <enum value="0" name="VK_SUCCESS"/>
        <enum value="-1" name="VK_ERROR_OUT_OF_HOST_MEMORY"/>
        <enum value="-2" name="VK_ERROR_OUT_OF_DEVICE_MEMORY"/>
    </enums>
    <commands>
        <command successcodes="VK_SUCCESS" errorcodes="VK_ERROR_OUT_OF_HOST_MEMORY">
            <proto><type>VkResult</type> <name>vkCreateInstance</name></proto>
            <param><type>uint32_t</type> <name>flags</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkGetDeviceQueue</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
            <param><type>uint32_t</type> <name>queueIndex</name></param>
            <param><type>VkQueue</type>* <name>pQueue</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkDestroyInstance</name></proto>
            <param><type>VkInstance</type> <name>instance</name></param>
        </command>
    </commands>
</registry>"#,
        )
        .unwrap()
    }

    #[test]
    fn base_types_become_usings() {
        let reg = registry();
        let text = emit_base_types(&reg);
        assert!(text.contains("using Bool32 = uint32_t;"));
    }

    #[test]
    fn exceptions_cover_error_codes() {
        let reg = registry();
        let text = emit_result_exceptions(&reg);
        assert!(text.contains("class OutOfHostMemoryError : public SystemError"));
        assert!(text.contains("class OutOfDeviceMemoryError : public SystemError"));
        assert!(text.contains(
            "case Result::eErrorOutOfHostMemory: throw OutOfHostMemoryError( message );"
        ));
    }

    #[test]
    fn struct_extends_emits_edges() {
        let reg = registry();
        let text = emit_struct_extends(&reg);
        assert!(text.contains("struct StructExtends<ExtraInfo, DeviceCreateInfo>"));
        assert!(text.contains("value = true"));
    }

    #[test]
    fn dispatch_levels_partition_commands() {
        let reg = registry();
        assert_eq!(
            dispatch_level(&reg, &reg.commands["vkCreateInstance"]),
            DispatchLevel::Global
        );
        assert_eq!(
            dispatch_level(&reg, &reg.commands["vkDestroyInstance"]),
            DispatchLevel::Instance
        );
        assert_eq!(
            dispatch_level(&reg, &reg.commands["vkGetDeviceQueue"]),
            DispatchLevel::Device
        );
    }

    #[test]
    fn dynamic_loader_has_three_init_phases() {
        let reg = registry();
        let text = emit_dispatch_dynamic(&reg);
        assert!(text.contains("PFN_vkCreateInstance vkCreateInstance = 0;"));
        assert!(text.contains("vkGetInstanceProcAddr( NULL, \"vkCreateInstance\" )"));
        assert!(text.contains("void init( VkInstance instance )"));
        assert!(text.contains("vkGetDeviceProcAddr( device, \"vkGetDeviceQueue\" )"));
    }

    #[test]
    fn static_loader_forwards_to_global_symbols() {
        let reg = registry();
        let text = emit_dispatch_static(&reg);
        assert!(text.contains("VkResult vkCreateInstance( uint32_t flags ) const VULKAN_HPP_NOEXCEPT"));
        assert!(text.contains("return ::vkCreateInstance( flags );"));
        assert!(text.contains("::vkGetDeviceQueue( device, queueIndex, pQueue );"));
    }

    #[test]
    fn hashes_cover_handles() {
        let reg = registry();
        let text = emit_hashes(&reg);
        assert!(text.contains("struct hash<VULKAN_HPP_NAMESPACE::Queue>"));
        assert!(text.contains("std::hash<VkQueue>{}( static_cast<VkQueue>( queue ) )"));
    }
}
