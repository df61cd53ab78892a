//! `#[component]` 实现
//!
//! 作用于 impl 块，使用标记 `#[constructor]` 的关联函数构造组件，
//! 其参数即构造参数依赖。

use crate::utils::{dependency_type, has_attribute, is_result_type, InjectableArgs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    punctuated::Punctuated, FnArg, ImplItem, ImplItemFn, ItemImpl, Meta, Result, ReturnType, Token,
};

/// 实现 #[component] 宏
pub fn component_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let result = syn::parse::Parser::parse(Punctuated::<Meta, Token![,]>::parse_terminated, args)
        .and_then(InjectableArgs::from_metas)
        .and_then(|args| {
            let item = syn::parse::<ItemImpl>(input)?;
            expand(args, item)
        });

    match result {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(args: InjectableArgs, mut item: ItemImpl) -> Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[component] 只能用于固有 impl 块",
        ));
    }

    let constructor = take_constructor(&mut item)?;
    let fn_name = &constructor.sig.ident;

    let mut parameters = Vec::new();
    let mut arguments = Vec::new();
    for input in &constructor.sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            return Err(syn::Error::new_spanned(
                input,
                "#[constructor] 必须是不带 self 的关联函数",
            ));
        };

        let dependency = dependency_type(&pat_type.ty).ok_or_else(|| {
            syn::Error::new_spanned(&pat_type.ty, "构造参数必须是 Arc<T> 或 Option<Arc<T>>")
        })?;
        let target = dependency.target;

        parameters.push(quote! { ::di_abstractions::TypeInfo::of::<#target>() });
        arguments.push(if dependency.optional {
            quote! { ::di_abstractions::DependencyResolverExt::optional::<#target>(resolver)? }
        } else {
            quote! { ::di_abstractions::DependencyResolverExt::require::<#target>(resolver)? }
        });
    }

    let call = quote! { Self::#fn_name(#(#arguments),*) };
    let body = match &constructor.sig.output {
        ReturnType::Type(_, ty) if is_result_type(ty) => quote! { ::std::result::Result::Ok(#call?) },
        _ => quote! { ::std::result::Result::Ok(#call) },
    };

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let into_instance = crate::injectable::lifecycle_instance(&args);

    Ok(quote! {
        #item

        impl #impl_generics ::di_abstractions::Injectable for #self_ty #where_clause {
            fn constructor_parameters() -> ::std::vec::Vec<::di_abstractions::TypeInfo> {
                ::std::vec![#(#parameters),*]
            }

            #[allow(unused_variables)]
            fn construct(
                resolver: &dyn ::di_abstractions::DependencyResolver,
            ) -> ::std::result::Result<Self, ::di_abstractions::DynError> {
                #body
            }

            #into_instance
        }
    })
}

/// 找到唯一的 `#[constructor]` 函数并移除该标记
fn take_constructor(item: &mut ItemImpl) -> Result<ImplItemFn> {
    let mut found: Option<ImplItemFn> = None;

    for impl_item in &mut item.items {
        let ImplItem::Fn(function) = impl_item else {
            continue;
        };
        if !has_attribute(&function.attrs, "constructor") {
            continue;
        }

        function
            .attrs
            .retain(|attr| !attr.path().is_ident("constructor"));
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                &function.sig.ident,
                "只能有一个 #[constructor] 函数",
            ));
        }
        found = Some(function.clone());
    }

    found.ok_or_else(|| {
        syn::Error::new_spanned(&item.self_ty, "#[component] 需要一个标记 #[constructor] 的函数")
    })
}
