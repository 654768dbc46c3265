use ccg_graph::{EdgeKind, NodeKind};
use clap::ValueEnum;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum NodeKindFlag {
    Module,
    Class,
    Function,
    File,
}

impl NodeKindFlag {
    pub(crate) const fn as_domain(self) -> NodeKind {
        match self {
            NodeKindFlag::Module => NodeKind::Module,
            NodeKindFlag::Class => NodeKind::Class,
            NodeKindFlag::Function => NodeKind::Function,
            NodeKindFlag::File => NodeKind::File,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
#[value(rename_all = "snake_case")]
pub(crate) enum EdgeKindFlag {
    Contains,
    BelongsTo,
    InheritsFrom,
    InheritedBy,
    Calls,
    CalledBy,
    Imports,
    ImportedBy,
}

impl EdgeKindFlag {
    pub(crate) const fn as_domain(self) -> EdgeKind {
        match self {
            EdgeKindFlag::Contains => EdgeKind::Contains,
            EdgeKindFlag::BelongsTo => EdgeKind::BelongsTo,
            EdgeKindFlag::InheritsFrom => EdgeKind::InheritsFrom,
            EdgeKindFlag::InheritedBy => EdgeKind::InheritedBy,
            EdgeKindFlag::Calls => EdgeKind::Calls,
            EdgeKindFlag::CalledBy => EdgeKind::CalledBy,
            EdgeKindFlag::Imports => EdgeKind::Imports,
            EdgeKindFlag::ImportedBy => EdgeKind::ImportedBy,
        }
    }
}
