/// Declares a node namespace enum over concrete node structs and derives the
/// common plumbing: the [`Tree`](crate::tree::Tree) impl, [`TreeCast`](crate::tree::TreeCast)
/// narrowing for each struct, `into_tree` constructors and the structural-sharing
/// child walk.
///
/// Every struct listed must carry `id`, `prefix` and `markers` fields and an
/// inherent `map_children` method.
macro_rules! tree_namespace {
    ($(#[$meta:meta])* $enum:ident { $($variant:ident($ty:ident) => $kind:path),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub enum $enum {
            $($variant($ty)),*
        }

        impl $crate::tree::Tree for $enum {
            fn kind(&self) -> $crate::tree::Kind {
                match self {
                    $($enum::$variant(_) => $kind),*
                }
            }

            fn id(&self) -> $crate::tree::NodeId {
                match self {
                    $($enum::$variant(n) => n.id),*
                }
            }

            fn prefix(&self) -> &$crate::tree::Space {
                match self {
                    $($enum::$variant(n) => &n.prefix),*
                }
            }

            fn markers(&self) -> &$crate::tree::Markers {
                match self {
                    $($enum::$variant(n) => &n.markers),*
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn with_prefix(&self, prefix: $crate::tree::Space) -> $crate::tree::TreeRef {
                match self {
                    $($enum::$variant(n) => ::std::sync::Arc::new($enum::$variant($ty { prefix, ..n.clone() }))),*
                }
            }

            fn with_markers(&self, markers: $crate::tree::Markers) -> $crate::tree::TreeRef {
                match self {
                    $($enum::$variant(n) => ::std::sync::Arc::new($enum::$variant($ty { markers, ..n.clone() }))),*
                }
            }

            fn with_id(&self, id: $crate::tree::NodeId) -> $crate::tree::TreeRef {
                match self {
                    $($enum::$variant(n) => ::std::sync::Arc::new($enum::$variant($ty { id, ..n.clone() }))),*
                }
            }
        }

        impl $enum {
            /// Visits every child through `visitor`; `None` when nothing changed.
            pub(crate) async fn map_children(
                &self,
                visitor: &mut dyn $crate::visitor::ChildVisitor,
                cursor: &$crate::visitor::Cursor,
            ) -> $crate::Result<Option<$enum>> {
                match self {
                    $($enum::$variant(n) => Ok(n.map_children(visitor, cursor).await?.map($enum::$variant))),*
                }
            }
        }

        $(
            impl $crate::tree::TreeCast for $ty {
                fn cast(tree: &dyn $crate::tree::Tree) -> Option<&Self> {
                    #[allow(unreachable_patterns)]
                    match tree.as_any().downcast_ref::<$enum>()? {
                        $enum::$variant(n) => Some(n),
                        _ => None,
                    }
                }
            }

            impl $ty {
                pub fn into_tree(self) -> $crate::tree::TreeRef {
                    ::std::sync::Arc::new($enum::$variant(self))
                }
            }
        )*
    };
}
