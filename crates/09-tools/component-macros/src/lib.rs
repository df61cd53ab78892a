//! # Component Macros
//!
//! 为组件生成 `Injectable` 实现：依赖元数据和构造方式。
//!
//! ## 核心宏
//!
//! - [`Injectable`] - 派生宏，`#[inject]` 字段作为注入成员
//! - [`component`] - 作用于 impl 块，`#[constructor]` 函数的参数作为构造参数
//!
//! 生成的代码引用 `di_abstractions`，使用方需要依赖该 crate。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::{component, Injectable};
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! #[injectable(lifecycle)]
//! pub struct ReportService {
//!     #[inject]
//!     database: Arc<Database>,
//!     #[inject]
//!     cache: Option<Arc<dyn Cache>>,
//!     generated: AtomicUsize,
//! }
//!
//! pub struct UserService {
//!     database: Arc<Database>,
//! }
//!
//! #[component]
//! impl UserService {
//!     #[constructor]
//!     pub fn new(database: Arc<Database>) -> Self {
//!         Self { database }
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod injectable;
mod utils;

/// 可注入组件派生宏
///
/// 标记 `#[inject]` 的字段必须是 `Arc<T>` 或 `Option<Arc<T>>`（`T` 可以是 trait object），
/// 它们按声明顺序成为注入成员；其余字段使用 `Default::default()` 初始化。
///
/// 结构体上的 `#[injectable(lifecycle)]` 表示组件实现了 `Lifecycle`，
/// 实例会暴露启动/停止能力。
#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::derive_injectable_impl(input)
}

/// 构造函数注入宏
///
/// 作用于 impl 块，其中恰好一个关联函数标记 `#[constructor]`。函数参数必须是 `Arc<T>`
/// 或 `Option<Arc<T>>`，返回 `Self` 或 `Result<Self, E>`。
///
/// # 参数
///
/// - `lifecycle` - 组件实现了 `Lifecycle`
///
/// # 示例
///
/// ```rust,ignore
/// #[component(lifecycle)]
/// impl HttpServer {
///     #[constructor]
///     fn new(config: Arc<ServerConfig>) -> Result<Self, std::io::Error> {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn component(args: TokenStream, input: TokenStream) -> TokenStream {
    component::component_impl(args, input)
}
