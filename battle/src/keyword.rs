//! Closed keyword enums spelled by a single name table.

/// Define a keyword enum from `Variant => "name"` pairs. The serde form,
/// `as_str`, `ALL` and `FromStr` are all generated from that one table;
/// `FromStr` reports unknown names through `$unknown(&str) -> BattleError`.
macro_rules! keyword_enum {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident, unknown = $unknown:path {
            $( $(#[$variant_attr:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$attr])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $( $(#[$variant_attr])* #[serde(rename = $text)] $variant, )+
        }

        impl $name {
            /// Every keyword, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::error::BattleError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|keyword| keyword.as_str() == s)
                    .ok_or_else(|| $unknown(s))
            }
        }
    };
}
