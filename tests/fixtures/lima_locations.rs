//! Real Lima locations for realistic test fixtures.
//!
//! Coordinates are approximate shop and market positions taken from
//! OpenStreetMap, grouped by district.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// Miraflores
// ============================================================================

pub const MIRAFLORES: &[Location] = &[
    Location::new("Bodega Larco", -12.1218, -77.0297),
    Location::new("Minimarket Diagonal", -12.1205, -77.0305),
    Location::new("Bodega Schell", -12.1227, -77.0318),
    Location::new("Market Benavides", -12.1263, -77.0252),
    Location::new("Bodega Porta", -12.1243, -77.0281),
    Location::new("Mercado 1 Surquillo", -12.1121, -77.0260),
    Location::new("Bodega Comandante Espinar", -12.1170, -77.0378),
    Location::new("Minimarket Pardo", -12.1189, -77.0362),
    Location::new("Bodega Angamos", -12.1131, -77.0331),
    Location::new("Bodega Recavarren", -12.1251, -77.0303),
    Location::new("Minimarket Alcanfores", -12.1238, -77.0265),
    Location::new("Bodega La Paz", -12.1229, -77.0277),
];

// ============================================================================
// San Isidro
// ============================================================================

pub const SAN_ISIDRO: &[Location] = &[
    Location::new("Bodega Conquistadores", -12.1007, -77.0372),
    Location::new("Minimarket Camino Real", -12.0959, -77.0394),
    Location::new("Bodega Los Libertadores", -12.0989, -77.0411),
    Location::new("Market Javier Prado", -12.0920, -77.0340),
    Location::new("Bodega Rivera Navarrete", -12.0942, -77.0291),
    Location::new("Bodega Dos de Mayo", -12.1002, -77.0337),
    Location::new("Minimarket Pezet", -12.1044, -77.0459),
    Location::new("Bodega Las Begonias", -12.0921, -77.0247),
];

// ============================================================================
// Cercado de Lima
// ============================================================================

pub const CERCADO: &[Location] = &[
    Location::new("Bodega Jiron de la Union", -12.0483, -77.0337),
    Location::new("Mercado Central", -12.0497, -77.0264),
    Location::new("Bodega Abancay", -12.0520, -77.0281),
    Location::new("Bodega Emancipacion", -12.0492, -77.0360),
    Location::new("Minimarket Tacna", -12.0514, -77.0375),
    Location::new("Bodega Plaza San Martin", -12.0519, -77.0349),
];

// ============================================================================
// Santiago de Surco
// ============================================================================

pub const SURCO: &[Location] = &[
    Location::new("Bodega Primavera", -12.1110, -76.9930),
    Location::new("Minimarket Benavides Surco", -12.1290, -76.9880),
    Location::new("Bodega Higuereta", -12.1300, -77.0020),
    Location::new("Bodega Caminos del Inca", -12.1210, -76.9850),
    Location::new("Minimarket Monterrico", -12.1050, -76.9730),
    Location::new("Bodega El Polo", -12.0990, -76.9700),
];

/// Every fixture location, district by district.
pub fn all() -> Vec<&'static Location> {
    MIRAFLORES
        .iter()
        .chain(SAN_ISIDRO)
        .chain(CERCADO)
        .chain(SURCO)
        .collect()
}
