//! File granularity and the kind classification tables derived from it.

use std::fmt;
use std::str::FromStr;

use crate::model::ApiItemKind;
use ApiItemKind as K;

/// The level at which items stop starting their own file and become
/// anchors inside their parent's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Granularity {
    Model,
    Package,
    Namespace,
    Export,
    Member,
}

const MODEL_KINDS: &[ApiItemKind] = &[K::Model];
const PACKAGE_KINDS: &[ApiItemKind] = &[K::Package];
const NAMESPACE_KINDS: &[ApiItemKind] = &[K::Namespace];
const EXPORT_KINDS: &[ApiItemKind] = &[
    K::Class,
    K::Enum,
    K::Function,
    K::Interface,
    K::TypeAlias,
    K::Variable,
];
const MEMBER_KINDS: &[ApiItemKind] = &[
    K::CallSignature,
    K::ConstructSignature,
    K::Constructor,
    K::EnumMember,
    K::Method,
    K::MethodSignature,
    K::Property,
    K::PropertySignature,
];

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Model,
        Granularity::Package,
        Granularity::Namespace,
        Granularity::Export,
        Granularity::Member,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Model => "model",
            Granularity::Package => "package",
            Granularity::Namespace => "namespace",
            Granularity::Export => "export",
            Granularity::Member => "member",
        }
    }

    /// Kinds introduced at exactly this level.
    fn own_kinds(self) -> &'static [ApiItemKind] {
        match self {
            Granularity::Model => MODEL_KINDS,
            Granularity::Package => PACKAGE_KINDS,
            Granularity::Namespace => NAMESPACE_KINDS,
            Granularity::Export => EXPORT_KINDS,
            Granularity::Member => MEMBER_KINDS,
        }
    }

    /// True when items of `kind` start their own file at this granularity.
    pub fn is_file_level(self, kind: ApiItemKind) -> bool {
        Self::ALL
            .iter()
            .take_while(|g| **g <= self)
            .any(|g| g.own_kinds().contains(&kind))
    }

    /// True when `kind` belongs to this granularity's own level.
    pub fn is_file_level_exact(self, kind: ApiItemKind) -> bool {
        self.own_kinds().contains(&kind)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown file level: {s}. Use model, package, namespace, export, or member")
            })
    }
}

/// Kinds that never receive a path or a page.
pub fn is_ignored(kind: ApiItemKind) -> bool {
    matches!(kind, K::IndexSignature | K::None)
}

/// Kinds that are transparent in paths: their children are treated as
/// children of their parent.
pub fn is_skipped(kind: ApiItemKind) -> bool {
    kind == K::EntryPoint
}

/// Kinds that contribute a path segment.
pub fn is_included(kind: ApiItemKind) -> bool {
    kind != K::Model && Granularity::Member.is_file_level(kind)
}
