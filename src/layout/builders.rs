//! Incremental builders for horizontal and vertical boxes, plus the
//! `hbox!`/`vbox!`/`kern!`/`rule!` shorthands the engine is written in.

#![allow(dead_code)]

use crate::dimensions::{Px, Unit};

use super::{Alignment, HorizontalBox, LayoutNode, LayoutVariant, VerticalBox};

pub struct VBox {
    pub width: Unit<Px>,
    pub height: Unit<Px>,
    pub depth: Unit<Px>,
    node: VerticalBox,
}

impl Default for VBox {
    fn default() -> Self {
        Self {
            width: Unit::ZERO,
            height: Unit::ZERO,
            depth: Unit::ZERO,
            node: VerticalBox::default(),
        }
    }
}

impl VBox {
    pub fn new() -> VBox {
        VBox::default()
    }

    pub fn add_node(&mut self, node: LayoutNode) {
        self.width = Unit::max(self.width, node.width);
        self.height += node.height;
        self.node.contents.push(node);
    }

    pub fn insert_node(&mut self, idx: usize, node: LayoutNode) {
        self.width = Unit::max(self.width, node.width);
        self.height += node.height;
        self.node.contents.insert(idx, node);
    }

    pub fn set_offset(&mut self, offset: Unit<Px>) {
        self.node.offset = offset;
    }

    pub fn set_alignment(&mut self, align: Alignment) {
        self.node.alignment = align;
    }

    pub fn build(mut self) -> LayoutNode {
        // The depth of a vertical box comes from its last element.
        if let Some(node) = self.node.contents.last() {
            self.depth = node.depth;
        }

        self.depth -= self.node.offset;
        self.height -= self.node.offset;

        LayoutNode {
            width: self.width,
            height: self.height,
            depth: self.depth,
            node: LayoutVariant::VerticalBox(self.node),
        }
    }
}

pub struct HBox {
    pub width: Unit<Px>,
    pub height: Unit<Px>,
    pub depth: Unit<Px>,
    pub node: HorizontalBox,
}

impl Default for HBox {
    fn default() -> Self {
        Self {
            width: Unit::ZERO,
            height: Unit::ZERO,
            depth: Unit::ZERO,
            node: HorizontalBox::default(),
        }
    }
}

impl HBox {
    pub fn new() -> HBox {
        HBox::default()
    }

    pub fn add_node(&mut self, node: LayoutNode) {
        self.width += node.width;
        self.height = Unit::max(self.height, node.height);
        self.depth = Unit::min(self.depth, node.depth);
        self.node.contents.push(node);
    }

    pub fn set_offset(&mut self, offset: Unit<Px>) {
        self.node.offset = offset;
    }

    pub fn set_alignment(&mut self, align: Alignment) {
        self.node.alignment = align;
    }

    pub fn set_width(&mut self, width: Unit<Px>) {
        self.width = width;
    }

    pub fn build(mut self) -> LayoutNode {
        self.depth -= self.node.offset;
        self.height -= self.node.offset;

        LayoutNode {
            width: self.width,
            height: self.height,
            depth: self.depth,
            node: LayoutVariant::HorizontalBox(self.node),
        }
    }
}

macro_rules! vbox {
    (offset: $offset:expr; $($node:expr),*) => ({
        let mut _vbox = $crate::layout::builders::VBox::new();
        $( _vbox.add_node($node); )*
        _vbox.set_offset($offset);
        _vbox.build()
    });

    ( $($node:expr),* ) => ({
        let mut _vbox = $crate::layout::builders::VBox::new();
        $( _vbox.add_node($node); )*
        _vbox.build()
    });
}

macro_rules! hbox {
    (offset: $offset:expr; $($node:expr),*) => ({
        let mut _hbox = $crate::layout::builders::HBox::new();
        $( _hbox.add_node($node); )*
        _hbox.set_offset($offset);
        _hbox.build()
    });

    (align: $align:expr; width: $width:expr; $($node:expr),*) => ({
        let mut _hbox = $crate::layout::builders::HBox::new();
        let align = $align;
        let width = $width;
        $( _hbox.add_node($node); )*
        _hbox.set_alignment(align);
        _hbox.set_width(width);
        _hbox.build()
    });

    ( $($node:expr),* ) => ({
        let mut _hbox = $crate::layout::builders::HBox::new();
        $( _hbox.add_node($node); )*
        _hbox.build()
    });
}

macro_rules! kern {
    (horz: $width:expr) => (
        $crate::layout::LayoutNode {
            width: $width,
            height: $crate::dimensions::Unit::ZERO,
            depth: $crate::dimensions::Unit::ZERO,
            node: $crate::layout::LayoutVariant::Kern,
        }
    );

    (vert: $height:expr) => (
        $crate::layout::LayoutNode {
            width: $crate::dimensions::Unit::ZERO,
            height: $height,
            depth: $crate::dimensions::Unit::ZERO,
            node: $crate::layout::LayoutVariant::Kern,
        }
    );
}

macro_rules! rule {
    (width: $width:expr, height: $height:expr) => (
        rule!(width: $width, height: $height, depth: $crate::dimensions::Unit::ZERO)
    );

    (width: $width:expr, height: $height:expr, depth: $depth:expr) => (
        $crate::layout::LayoutNode {
            width: $width,
            height: $height,
            depth: $depth,
            node: $crate::layout::LayoutVariant::Rule,
        }
    );
}
