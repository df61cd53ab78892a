//! 宏工具函数

use syn::{
    punctuated::Punctuated, Attribute, Field, GenericArgument, Meta, PathArguments, Result, Token,
    Type,
};

/// 从类型中提取泛型参数
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            match &segment.arguments {
                PathArguments::AngleBracketed(args) => match args.args.first() {
                    Some(GenericArgument::Type(inner_type)) => Some(inner_type),
                    _ => None,
                },
                _ => None,
            }
        }
        _ => None,
    }
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == name)
            .unwrap_or(false),
        _ => false,
    }
}

/// 检查类型是否为 Option<T>
pub fn is_option_type(ty: &Type) -> bool {
    last_segment_is(ty, "Option")
}

/// 检查类型是否为 Result<T, E>
pub fn is_result_type(ty: &Type) -> bool {
    last_segment_is(ty, "Result")
}

/// 检查类型是否为 Arc<T>
pub fn is_arc_type(ty: &Type) -> bool {
    last_segment_is(ty, "Arc")
}

/// 依赖类型
pub struct Dependency<'a> {
    /// `Arc<T>` 中的 `T`
    pub target: &'a Type,
    /// 是否为 `Option<Arc<T>>`
    pub optional: bool,
}

/// 解析 `Arc<T>` 或 `Option<Arc<T>>` 形式的依赖类型
pub fn dependency_type(ty: &Type) -> Option<Dependency<'_>> {
    if is_option_type(ty) {
        let inner = extract_generic_type(ty)?;
        if !is_arc_type(inner) {
            return None;
        }
        return Some(Dependency {
            target: extract_generic_type(inner)?,
            optional: true,
        });
    }

    if is_arc_type(ty) {
        return Some(Dependency {
            target: extract_generic_type(ty)?,
            optional: false,
        });
    }

    None
}

/// 检查属性列表中是否有特定属性
pub fn has_attribute(attrs: &[Attribute], attr_name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(attr_name))
}

/// 检查字段是否有特定属性
pub fn field_has_attribute(field: &Field, attr_name: &str) -> bool {
    has_attribute(&field.attrs, attr_name)
}

/// 宏参数
#[derive(Debug, Clone, Default)]
pub struct InjectableArgs {
    /// 实例是否暴露生命周期能力
    pub lifecycle: bool,
}

impl InjectableArgs {
    /// 解析逗号分隔的参数列表
    pub fn from_metas(metas: Punctuated<Meta, Token![,]>) -> Result<Self> {
        let mut args = Self::default();

        for meta in metas {
            match meta {
                Meta::Path(path) if path.is_ident("lifecycle") => args.lifecycle = true,
                other => {
                    return Err(syn::Error::new_spanned(other, "不支持的参数，可用参数: lifecycle"));
                }
            }
        }

        Ok(args)
    }

    /// 从 `#[name(...)]` 属性中解析
    pub fn from_attributes(attrs: &[Attribute], attr_name: &str) -> Result<Self> {
        let mut args = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident(attr_name)) {
            let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            args.lifecycle |= Self::from_metas(metas)?.lifecycle;
        }

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;
    use syn::parse_quote;

    fn render(ty: &Type) -> String {
        ty.to_token_stream().to_string().replace(' ', "")
    }

    #[test]
    fn test_type_predicates() {
        let option: Type = parse_quote!(Option<Arc<Config>>);
        let result: Type = parse_quote!(std::result::Result<Self, String>);
        let arc: Type = parse_quote!(std::sync::Arc<Config>);

        assert!(is_option_type(&option));
        assert!(is_result_type(&result));
        assert!(is_arc_type(&arc));
        assert!(!is_arc_type(&option));
    }

    #[test]
    fn test_dependency_type() {
        let required: Type = parse_quote!(Arc<Database>);
        let optional: Type = parse_quote!(Option<Arc<dyn Cache>>);
        let plain: Type = parse_quote!(String);
        let boxed: Type = parse_quote!(Option<Box<Database>>);

        let dependency = dependency_type(&required).unwrap();
        assert_eq!(render(dependency.target), "Database");
        assert!(!dependency.optional);

        let dependency = dependency_type(&optional).unwrap();
        assert_eq!(render(dependency.target), "dynCache");
        assert!(dependency.optional);

        assert!(dependency_type(&plain).is_none());
        assert!(dependency_type(&boxed).is_none());
    }

    #[test]
    fn test_injectable_args() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[injectable(lifecycle)])];
        let args = InjectableArgs::from_attributes(&attrs, "injectable").unwrap();
        assert!(args.lifecycle);

        let attrs: Vec<Attribute> = vec![parse_quote!(#[injectable(scoped)])];
        assert!(InjectableArgs::from_attributes(&attrs, "injectable").is_err());

        let args = InjectableArgs::from_attributes(&[], "injectable").unwrap();
        assert!(!args.lifecycle);
    }
}
