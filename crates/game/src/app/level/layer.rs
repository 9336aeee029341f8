/// Per-chunk content categories. The discriminant is the layer id used by
/// draw ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Layer {
    Background = 4,
    Solid = 10,
    Coins = 11,
    Effects = 20,
    Fireflies = 21,
}

impl Layer {
    #[cfg(test)]
    pub(crate) const ALL: [Layer; 5] = [
        Layer::Background,
        Layer::Solid,
        Layer::Coins,
        Layer::Effects,
        Layer::Fireflies,
    ];

    /// Layers with per-tick behaviour. Tile layers are static.
    pub(crate) const ANIMATED: [Layer; 3] = [Layer::Coins, Layer::Effects, Layer::Fireflies];

    #[cfg(test)]
    pub(crate) const fn id(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawStep {
    Layer(Layer),
    Player,
}

/// Back-to-front composition. The player sits on top of solid tiles and
/// below pickups and effects.
pub(crate) const DRAW_ORDER: [DrawStep; 6] = [
    DrawStep::Layer(Layer::Background),
    DrawStep::Layer(Layer::Solid),
    DrawStep::Player,
    DrawStep::Layer(Layer::Coins),
    DrawStep::Layer(Layer::Effects),
    DrawStep::Layer(Layer::Fireflies),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_ids_ascend_in_draw_order() {
        let ids: Vec<u8> = DRAW_ORDER
            .iter()
            .filter_map(|step| match step {
                DrawStep::Layer(layer) => Some(layer.id()),
                DrawStep::Player => None,
            })
            .collect();
        assert_eq!(ids, vec![4, 10, 11, 20, 21]);
        assert_eq!(DRAW_ORDER[2], DrawStep::Player);
    }

    #[test]
    fn every_layer_is_drawn_exactly_once() {
        for layer in Layer::ALL {
            let count = DRAW_ORDER
                .iter()
                .filter(|step| **step == DrawStep::Layer(layer))
                .count();
            assert_eq!(count, 1, "{layer:?}");
        }
    }
}
