//! Attribute layers.
//!
//! Every mesh domain (vertex, edge, legacy face, loop, polygon) can carry any
//! number of named, typed data layers registered at runtime. The two mesh
//! representations store them differently:
//!
//! - The flat mesh keeps one column per layer in a [`CustomData`], indexed by
//!   element position. Legacy-face corner layers hold four values per face.
//! - The topological mesh keeps one [`LayerLayout`] per domain and an
//!   [`AttrBlock`] on every element whose values are aligned with the layout.
//!
//! Moving payloads between the two is the job of the [`bridge`] module.
//!
//! # Example
//!
//! ```
//! use meshbridge::attr::{AttrValue, CustomData, LayerDef, LayerKind};
//!
//! let mut vdata = CustomData::new(3);
//! let weight = vdata.add_layer(LayerDef::new("weight", LayerKind::Float)).unwrap();
//! vdata.set(weight, 1, AttrValue::Float(0.5)).unwrap();
//!
//! assert_eq!(vdata.get(weight, 1), &AttrValue::Float(0.5));
//! assert_eq!(vdata.get(weight, 0), &AttrValue::Float(0.0));
//! ```

pub mod bridge;

use std::fmt;

use crate::error::{MeshError, Result};

/// Corner permutation that rotates a quad by two corners.
pub const QUAD_ROTATION: [usize; 4] = [2, 3, 0, 1];

/// Corner permutation that rotates a triangle by one corner.
pub const TRI_ROTATION: [usize; 3] = [1, 2, 0];

/// Number of corner slots stored per legacy face.
pub const LEGACY_CORNERS: usize = 4;

/// The element domain a layer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Per-vertex data.
    Vertex,
    /// Per-edge data.
    Edge,
    /// Per legacy fixed-arity face (flat mesh only).
    Face,
    /// Per face corner.
    Loop,
    /// Per n-gon polygon (a face in the topological mesh).
    Polygon,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Vertex => "vertex",
            Domain::Edge => "edge",
            Domain::Face => "legacy face",
            Domain::Loop => "loop",
            Domain::Polygon => "polygon",
        };
        f.write_str(name)
    }
}

/// The value type of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// A single float.
    Float,
    /// A signed 32-bit integer.
    Int,
    /// A boolean tag.
    Bool,
    /// Two floats (texture coordinates).
    Float2,
    /// Three floats.
    Float3,
    /// An 8-bit RGBA color.
    Color,
}

impl LayerKind {
    /// The zero value new elements receive.
    pub fn default_value(self) -> AttrValue {
        match self {
            LayerKind::Float => AttrValue::Float(0.0),
            LayerKind::Int => AttrValue::Int(0),
            LayerKind::Bool => AttrValue::Bool(false),
            LayerKind::Float2 => AttrValue::Float2([0.0; 2]),
            LayerKind::Float3 => AttrValue::Float3([0.0; 3]),
            LayerKind::Color => AttrValue::Color([0; 4]),
        }
    }
}

/// One value stored in a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue {
    /// A single float.
    Float(f32),
    /// A signed integer.
    Int(i32),
    /// A boolean tag.
    Bool(bool),
    /// Two floats.
    Float2([f32; 2]),
    /// Three floats.
    Float3([f32; 3]),
    /// An RGBA color.
    Color([u8; 4]),
}

impl AttrValue {
    /// The kind of this value.
    pub fn kind(&self) -> LayerKind {
        match self {
            AttrValue::Float(_) => LayerKind::Float,
            AttrValue::Int(_) => LayerKind::Int,
            AttrValue::Bool(_) => LayerKind::Bool,
            AttrValue::Float2(_) => LayerKind::Float2,
            AttrValue::Float3(_) => LayerKind::Float3,
            AttrValue::Color(_) => LayerKind::Color,
        }
    }
}

/// Definition of a layer: its name and value kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerDef {
    /// Layer name, unique within a domain.
    pub name: String,
    /// Value kind.
    pub kind: LayerKind,
}

impl LayerDef {
    /// Create a new layer definition.
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    fn check(&self, value: &AttrValue) -> Result<()> {
        if value.kind() == self.kind {
            Ok(())
        } else {
            Err(MeshError::LayerKindMismatch {
                layer: self.name.clone(),
                expected: self.kind,
                found: value.kind(),
            })
        }
    }
}

/// Ordered layer definitions for one domain of the topological mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerLayout {
    defs: Vec<LayerDef>,
}

impl LayerLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer and return its slot.
    pub fn add(&mut self, def: LayerDef) -> Result<usize> {
        if self.find(&def.name).is_some() {
            return Err(MeshError::DuplicateLayer { name: def.name });
        }
        self.defs.push(def);
        Ok(self.defs.len() - 1)
    }

    /// Find the slot of a layer by name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.defs.iter().position(|d| d.name == name)
    }

    /// Get a layer definition by slot.
    pub fn get(&self, slot: usize) -> Option<&LayerDef> {
        self.defs.get(slot)
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no layers are registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate over the layer definitions in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, LayerDef> {
        self.defs.iter()
    }

    /// A block holding the default value of every layer.
    pub fn default_block(&self) -> AttrBlock {
        AttrBlock {
            values: self.defs.iter().map(|d| d.kind.default_value()).collect(),
        }
    }
}

/// The attribute payload of one topological element.
///
/// Values are aligned with the [`LayerLayout`] of the element's domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrBlock {
    values: Vec<AttrValue>,
}

impl AttrBlock {
    /// Get the value in a slot.
    pub fn get(&self, slot: usize) -> Option<&AttrValue> {
        self.values.get(slot)
    }

    /// Set the value in a slot, checking it against the layout.
    pub fn set(&mut self, layout: &LayerLayout, slot: usize, value: AttrValue) -> Result<()> {
        let def = &layout.defs[slot];
        def.check(&value)?;
        self.values[slot] = value;
        Ok(())
    }

    /// All values in slot order.
    pub fn values(&self) -> &[AttrValue] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the block is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn put(&mut self, slot: usize, value: AttrValue) {
        self.values[slot] = value;
    }
}

/// One column of flat layer storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    def: LayerDef,
    corners: usize,
    values: Vec<AttrValue>,
}

impl Layer {
    /// The layer definition.
    pub fn def(&self) -> &LayerDef {
        &self.def
    }

    /// Layer name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Value kind.
    pub fn kind(&self) -> LayerKind {
        self.def.kind
    }

    /// Values stored per element (1, or 4 for legacy-face corner layers).
    pub fn corners(&self) -> usize {
        self.corners
    }

    /// Whether this layer stores one value per face corner.
    pub fn is_corner_layer(&self) -> bool {
        self.corners > 1
    }

    /// All values; element `i` owns `values[i * corners..(i + 1) * corners]`.
    pub fn values(&self) -> &[AttrValue] {
        &self.values
    }
}

/// Column storage for every layer of one flat domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomData {
    layers: Vec<Layer>,
    len: usize,
}

impl CustomData {
    /// Create storage for `len` elements with no layers.
    pub fn new(len: usize) -> Self {
        Self {
            layers: Vec::new(),
            len,
        }
    }

    /// Create storage for `len` elements with one layer per definition in `layout`.
    ///
    /// Only definitions are copied; every value starts at its default.
    pub fn from_layout(layout: &LayerLayout, len: usize) -> Self {
        let mut data = Self::new(len);
        for def in layout.iter() {
            data.push_layer(def.clone(), 1);
        }
        data
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the storage holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// All layers.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Get a layer by index.
    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    /// Find a layer by name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.def.name == name)
    }

    /// Register a layer with one value per element.
    pub fn add_layer(&mut self, def: LayerDef) -> Result<usize> {
        self.add_layer_with_corners(def, 1)
    }

    /// Register a layer with one value per legacy face corner.
    pub fn add_corner_layer(&mut self, def: LayerDef) -> Result<usize> {
        self.add_layer_with_corners(def, LEGACY_CORNERS)
    }

    fn add_layer_with_corners(&mut self, def: LayerDef, corners: usize) -> Result<usize> {
        if self.find(&def.name).is_some() {
            return Err(MeshError::DuplicateLayer { name: def.name });
        }
        Ok(self.push_layer(def, corners))
    }

    fn push_layer(&mut self, def: LayerDef, corners: usize) -> usize {
        let values = vec![def.kind.default_value(); self.len * corners];
        self.layers.push(Layer {
            def,
            corners,
            values,
        });
        self.layers.len() - 1
    }

    /// Drop every layer and element.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.len = 0;
    }

    /// Grow or shrink every layer to `len` elements.
    pub fn resize(&mut self, len: usize) {
        for layer in &mut self.layers {
            layer
                .values
                .resize(len * layer.corners, layer.def.kind.default_value());
        }
        self.len = len;
    }

    /// Layout of the layers that hold one value per element.
    pub fn layout(&self) -> LayerLayout {
        LayerLayout {
            defs: self
                .layers
                .iter()
                .filter(|l| !l.is_corner_layer())
                .map(|l| l.def.clone())
                .collect(),
        }
    }

    /// Get the value of an element.
    pub fn get(&self, layer: usize, element: usize) -> &AttrValue {
        self.get_corner(layer, element, 0)
    }

    /// Get the value of one corner of an element.
    pub fn get_corner(&self, layer: usize, element: usize, corner: usize) -> &AttrValue {
        let layer = &self.layers[layer];
        &layer.values[element * layer.corners + corner]
    }

    /// Set the value of an element.
    pub fn set(&mut self, layer: usize, element: usize, value: AttrValue) -> Result<()> {
        self.set_corner(layer, element, 0, value)
    }

    /// Set the value of one corner of an element.
    pub fn set_corner(
        &mut self,
        layer: usize,
        element: usize,
        corner: usize,
        value: AttrValue,
    ) -> Result<()> {
        self.layers[layer].def.check(&value)?;
        self.put(layer, element, corner, value);
        Ok(())
    }

    pub(crate) fn put(&mut self, layer: usize, element: usize, corner: usize, value: AttrValue) {
        let layer = &mut self.layers[layer];
        layer.values[element * layer.corners + corner] = value;
    }

    /// Permute the corner values of one element in every corner layer.
    ///
    /// After the call, corner `j` holds what corner `order[j]` held before.
    pub fn swap_corners(&mut self, element: usize, order: &[usize]) {
        for layer in self.layers.iter_mut().filter(|l| l.is_corner_layer()) {
            let base = element * layer.corners;
            let old: Vec<AttrValue> = order.iter().map(|&c| layer.values[base + c]).collect();
            layer.values[base..base + old.len()].copy_from_slice(&old);
        }
    }
}
