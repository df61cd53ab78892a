//! `#[derive(Injectable)]` 实现
//!
//! 标记 `#[inject]` 的字段作为注入成员，从解析器获取；其余字段使用 `Default`。

use crate::utils::{dependency_type, field_has_attribute, InjectableArgs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Result};

/// 实现 #[derive(Injectable)]
pub fn derive_injectable_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let args = InjectableArgs::from_attributes(&input.attrs, "injectable")?;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Injectable 只能派生在结构体上",
            ))
        }
    };

    let mut members = Vec::new();
    let mut initializers = Vec::new();
    for field in fields.iter() {
        let (member, initializer) = field_initializer(field)?;
        members.extend(member);
        initializers.push(initializer);
    }

    let body = match fields {
        Fields::Named(_) => {
            let names = fields.iter().map(|field| &field.ident);
            quote! { Self { #(#names: #initializers),* } }
        }
        Fields::Unnamed(_) => quote! { Self(#(#initializers),*) },
        Fields::Unit => quote! { Self },
    };

    let into_instance = lifecycle_instance(&args);

    Ok(quote! {
        impl #impl_generics ::di_abstractions::Injectable for #struct_name #ty_generics #where_clause {
            fn injected_members() -> ::std::vec::Vec<::di_abstractions::TypeInfo> {
                ::std::vec![#(#members),*]
            }

            #[allow(unused_variables)]
            fn construct(
                resolver: &dyn ::di_abstractions::DependencyResolver,
            ) -> ::std::result::Result<Self, ::di_abstractions::DynError> {
                ::std::result::Result::Ok(#body)
            }

            #into_instance
        }
    })
}

/// 返回 (注入成员类型信息, 字段初始化表达式)
fn field_initializer(field: &Field) -> Result<(Option<TokenStream2>, TokenStream2)> {
    if !field_has_attribute(field, "inject") {
        return Ok((None, quote! { ::std::default::Default::default() }));
    }

    let dependency = dependency_type(&field.ty).ok_or_else(|| {
        syn::Error::new_spanned(&field.ty, "#[inject] 字段必须是 Arc<T> 或 Option<Arc<T>>")
    })?;
    let target = dependency.target;

    let member = quote! { ::di_abstractions::TypeInfo::of::<#target>() };
    let initializer = if dependency.optional {
        quote! { ::di_abstractions::DependencyResolverExt::optional::<#target>(resolver)? }
    } else {
        quote! { ::di_abstractions::DependencyResolverExt::require::<#target>(resolver)? }
    };

    Ok((Some(member), initializer))
}

/// 生成 `into_instance`，仅在声明生命周期能力时覆盖默认实现
pub fn lifecycle_instance(args: &InjectableArgs) -> TokenStream2 {
    if args.lifecycle {
        quote! {
            fn into_instance(self) -> ::di_abstractions::Instance {
                ::di_abstractions::Instance::with_lifecycle(self)
            }
        }
    } else {
        TokenStream2::new()
    }
}
