//! Source and layer names, colors, and the layer definitions built from them.

use crate::surface::{ColorExpr, LayerFilter, LayerSpec, Paint, RadiusExpr};

/// Source holding zone polygons.
pub const ZONE_SOURCE: &str = "zones";
/// Source holding animal points (clustered).
pub const ANIMAL_SOURCE: &str = "animals";

/// Zone fill layer.
pub const ZONE_FILL_LAYER: &str = "zones-fill";
/// Zone outline layer.
pub const ZONE_OUTLINE_LAYER: &str = "zones-outline";
/// Cluster bubble layer.
pub const CLUSTER_LAYER: &str = "clusters";
/// Cluster count label layer.
pub const CLUSTER_COUNT_LAYER: &str = "cluster-count";
/// Unclustered animal layer.
pub const ANIMAL_LAYER: &str = "animals-layer";

/// Fill of a zone with at least one animal in it.
pub const OCCUPIED_ZONE_FILL: &str = "rgba(34,197,94,0.25)";
/// Fill of an empty zone.
pub const EMPTY_ZONE_FILL: &str = "rgba(255,255,255,0.1)";
/// Zone outline accent.
pub const ZONE_OUTLINE: &str = "#16a34a";
/// Key point marker color.
pub const KEY_POINT_MARKER: &str = "#f97316";
/// Animal color when its herd has none.
pub const DEFAULT_HERD_COLOR: &str = "#22c55e";

const CLUSTER_FILL: &str = "#22c55e";
const CLUSTER_STROKE: &str = "#15803d";
const ANIMAL_STROKE: &str = "#ffffff";
const LABEL_COLOR: &str = "#ffffff";

/// Zone feature property read by the fill color expression.
pub(crate) const OCCUPANCY_PROPERTY: &str = "animal_count";
/// Animal feature property read by the point color expression.
pub(crate) const HERD_COLOR_PROPERTY: &str = "herd_color";

pub(crate) fn zone_fill() -> LayerSpec {
    LayerSpec {
        id: ZONE_FILL_LAYER.to_owned(),
        source: ZONE_SOURCE.to_owned(),
        filter: LayerFilter::All,
        paint: Paint::Fill {
            color: ColorExpr::WhenPositive {
                property: OCCUPANCY_PROPERTY.to_owned(),
                then: OCCUPIED_ZONE_FILL.to_owned(),
                otherwise: EMPTY_ZONE_FILL.to_owned(),
            },
        },
    }
}

pub(crate) fn zone_outline() -> LayerSpec {
    LayerSpec {
        id: ZONE_OUTLINE_LAYER.to_owned(),
        source: ZONE_SOURCE.to_owned(),
        filter: LayerFilter::All,
        paint: Paint::Line {
            color: ZONE_OUTLINE.to_owned(),
            width: 2.0,
            dasharray: vec![2.0, 2.0],
        },
    }
}

pub(crate) fn clusters() -> LayerSpec {
    LayerSpec {
        id: CLUSTER_LAYER.to_owned(),
        source: ANIMAL_SOURCE.to_owned(),
        filter: LayerFilter::Clustered,
        paint: Paint::Circle {
            color: ColorExpr::Fixed(CLUSTER_FILL.to_owned()),
            radius: RadiusExpr::StepByPointCount {
                base: 18.0,
                steps: vec![(10, 24.0), (50, 32.0)],
            },
            stroke_width: 2.0,
            stroke_color: CLUSTER_STROKE.to_owned(),
        },
    }
}

pub(crate) fn cluster_count() -> LayerSpec {
    LayerSpec {
        id: CLUSTER_COUNT_LAYER.to_owned(),
        source: ANIMAL_SOURCE.to_owned(),
        filter: LayerFilter::Clustered,
        paint: Paint::Symbol {
            text_field: String::from("point_count_abbreviated"),
            text_size: 12.0,
            text_color: LABEL_COLOR.to_owned(),
        },
    }
}

pub(crate) fn animals() -> LayerSpec {
    LayerSpec {
        id: ANIMAL_LAYER.to_owned(),
        source: ANIMAL_SOURCE.to_owned(),
        filter: LayerFilter::Unclustered,
        paint: Paint::Circle {
            color: ColorExpr::Property {
                property: HERD_COLOR_PROPERTY.to_owned(),
                fallback: DEFAULT_HERD_COLOR.to_owned(),
            },
            radius: RadiusExpr::Fixed(7.0),
            stroke_width: 2.0,
            stroke_color: ANIMAL_STROKE.to_owned(),
        },
    }
}
