//! Per-element attribute transfer between flat storage and topological blocks.
//!
//! A [`LayerMap`] pairs the layers of a source domain with the layers of a
//! destination domain by name and kind. It is built once per domain and
//! then used for every element, so a conversion never searches layers by
//! name inside its element loops. Layers without a counterpart on the
//! destination are skipped.

use super::{AttrBlock, CustomData, LayerDef, LayerLayout};

/// Pairs of (source slot, destination slot) for layers present on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerMap {
    pairs: Vec<(usize, usize)>,
}

impl LayerMap {
    fn build<'a, 'b>(
        src: impl Iterator<Item = (usize, &'a LayerDef)>,
        dst: impl Iterator<Item = (usize, &'b LayerDef)> + Clone,
    ) -> Self {
        let pairs = src
            .filter_map(|(si, sdef)| {
                dst.clone()
                    .find(|(_, ddef)| *ddef == sdef)
                    .map(|(di, _)| (si, di))
            })
            .collect();
        Self { pairs }
    }

    /// Map flat layers onto a topological layout.
    ///
    /// Corner layers have no counterpart in a topological domain and are skipped.
    pub fn flat_to_layout(src: &CustomData, dst: &LayerLayout) -> Self {
        Self::build(
            src.layers()
                .iter()
                .enumerate()
                .filter(|(_, l)| !l.is_corner_layer())
                .map(|(i, l)| (i, l.def())),
            dst.iter().enumerate(),
        )
    }

    /// Map a topological layout onto the flat layers holding `corners` values per element.
    pub fn layout_to_flat(src: &LayerLayout, dst: &CustomData, corners: usize) -> Self {
        let flat: Vec<(usize, &LayerDef)> = dst
            .layers()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.corners() == corners)
            .map(|(i, l)| (i, l.def()))
            .collect();
        Self::build(src.iter().enumerate(), flat.iter().copied())
    }

    /// Map one topological layout onto another.
    pub fn between_layouts(src: &LayerLayout, dst: &LayerLayout) -> Self {
        Self::build(src.iter().enumerate(), dst.iter().enumerate())
    }

    /// Number of paired layers.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no layers are paired.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Copy element `index` of `src` into `block`.
pub fn flat_to_block(src: &CustomData, index: usize, map: &LayerMap, block: &mut AttrBlock) {
    for &(s, d) in &map.pairs {
        block.put(d, *src.get(s, index));
    }
}

/// Copy `block` into element `index` of `dst`.
pub fn block_to_flat(block: &AttrBlock, map: &LayerMap, dst: &mut CustomData, index: usize) {
    block_to_flat_corner(block, map, dst, index, 0);
}

/// Copy `block` into one corner of element `index` of `dst`.
pub fn block_to_flat_corner(
    block: &AttrBlock,
    map: &LayerMap,
    dst: &mut CustomData,
    index: usize,
    corner: usize,
) {
    for &(s, d) in &map.pairs {
        dst.put(d, index, corner, block.values[s]);
    }
}

/// Copy one topological block into another.
pub fn block_to_block(src: &AttrBlock, map: &LayerMap, dst: &mut AttrBlock) {
    for &(s, d) in &map.pairs {
        dst.put(d, src.values[s]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{AttrValue, LayerKind};

    fn layout(defs: &[(&str, LayerKind)]) -> LayerLayout {
        let mut layout = LayerLayout::new();
        for (name, kind) in defs {
            layout.add(LayerDef::new(*name, *kind)).unwrap();
        }
        layout
    }

    #[test]
    fn test_map_matches_name_and_kind() {
        let src = layout(&[
            ("a", LayerKind::Float),
            ("b", LayerKind::Int),
            ("c", LayerKind::Bool),
        ]);
        // "b" changes kind and "c" is missing, so only "a" pairs.
        let dst = layout(&[("b", LayerKind::Float), ("a", LayerKind::Float)]);

        let map = LayerMap::between_layouts(&src, &dst);
        assert_eq!(map.len(), 1);

        let mut from = src.default_block();
        from.put(0, AttrValue::Float(2.5));
        from.put(1, AttrValue::Int(3));
        let mut to = dst.default_block();
        block_to_block(&from, &map, &mut to);

        assert_eq!(to.get(0), Some(&AttrValue::Float(0.0)));
        assert_eq!(to.get(1), Some(&AttrValue::Float(2.5)));
    }

    #[test]
    fn test_flat_block_round_trip() {
        let mut data = CustomData::new(2);
        let w = data.add_layer(LayerDef::new("w", LayerKind::Float3)).unwrap();
        data.add_corner_layer(LayerDef::new("uv", LayerKind::Float2))
            .unwrap();
        data.set(w, 1, AttrValue::Float3([1.0, 2.0, 3.0])).unwrap();

        let topo = data.layout();
        assert_eq!(topo.len(), 1);

        let map = LayerMap::flat_to_layout(&data, &topo);
        let mut block = topo.default_block();
        flat_to_block(&data, 1, &map, &mut block);
        assert_eq!(block.get(0), Some(&AttrValue::Float3([1.0, 2.0, 3.0])));

        let mut out = CustomData::from_layout(&topo, 2);
        let back = LayerMap::layout_to_flat(&topo, &out, 1);
        block_to_flat(&block, &back, &mut out, 0);
        assert_eq!(out.get(0, 0), &AttrValue::Float3([1.0, 2.0, 3.0]));
        assert_eq!(out.get(0, 1), &AttrValue::Float3([0.0; 3]));
    }

    #[test]
    fn test_corner_copy() {
        let topo = layout(&[("uv", LayerKind::Float2)]);
        let mut fdata = CustomData::new(1);
        fdata
            .add_corner_layer(LayerDef::new("uv", LayerKind::Float2))
            .unwrap();

        let map = LayerMap::layout_to_flat(&topo, &fdata, 4);
        assert_eq!(map.len(), 1);
        // A per-element map finds nothing among corner layers.
        assert!(LayerMap::layout_to_flat(&topo, &fdata, 1).is_empty());

        let mut block = topo.default_block();
        block.put(0, AttrValue::Float2([0.25, 0.75]));
        block_to_flat_corner(&block, &map, &mut fdata, 0, 2);

        assert_eq!(fdata.get_corner(0, 0, 2), &AttrValue::Float2([0.25, 0.75]));
        assert_eq!(fdata.get_corner(0, 0, 1), &AttrValue::Float2([0.0, 0.0]));
    }
}
