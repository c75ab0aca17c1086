//! 配置到组件的转换宏
//!
//! 编码器、输出端等组件统一通过 `From<Config>` 构造，便于注册表按名称创建

/// 为配置类型实现 `From<Config> for Type`
///
/// - `impl_from!(Config => Type)`：调用 `Type::new(config)`
/// - `impl_from!(Config => Type, field: config)`：直接构造 `Self { config }`
#[macro_export]
macro_rules! impl_from {
    ($config_type:ty => $target_type:ty) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                <$target_type>::new(config)
            }
        }
    };

    ($config_type:ty => $target_type:ty, field: $field:ident) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                Self { $field: config }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, Clone)]
    struct TagConfig {
        tag: String,
    }

    #[derive(Debug)]
    struct Tagger {
        config: TagConfig,
    }

    impl Tagger {
        fn new(config: TagConfig) -> Self {
            Self { config }
        }
    }

    #[derive(Debug)]
    struct RawTagger {
        config: TagConfig,
    }

    impl_from!(TagConfig => Tagger);
    impl_from!(TagConfig => RawTagger, field: config);

    #[test]
    fn test_impl_from_new() {
        let tagger = Tagger::from(TagConfig { tag: "db".to_string() });
        assert_eq!(tagger.config.tag, "db");
    }

    #[test]
    fn test_impl_from_field() {
        let tagger = RawTagger::from(TagConfig { tag: "raw".to_string() });
        assert_eq!(tagger.config.tag, "raw");
    }
}
