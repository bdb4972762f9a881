use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::Coordinates;

pub const DEFAULT_RADIUS_KM: f64 = 50.0;
const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Hotspot {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub density: &'static str,
    pub reports_last_30_days: u32,
    pub primary_debris: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Heatmap {
    pub center: Coordinates,
    pub radius_km: f64,
    pub hotspots: Vec<Hotspot>,
    pub total_reports: u32,
    pub last_updated: DateTime<Utc>,
}

struct Zone {
    name: &'static str,
    offset: f64,
    density: &'static str,
    reports: u32,
    debris: [&'static str; 3],
}

const ZONES: [Zone; 3] = [
    Zone {
        name: "North Coastal Zone",
        offset: 0.5,
        density: "High",
        reports: 12,
        debris: ["plastic bags", "bottles", "microplastics"],
    },
    Zone {
        name: "Central Bay Area",
        offset: 0.0,
        density: "Medium",
        reports: 8,
        debris: ["fishing nets", "foam", "plastic wrap"],
    },
    Zone {
        name: "South Harbor Zone",
        offset: -0.3,
        density: "Moderate",
        reports: 5,
        debris: ["cans", "plastic bags", "rubber"],
    },
];

/// Synthetic hotspot survey around `center`, keeping zones whose rough
/// planar distance falls inside `radius_km`.
pub fn survey(center: Coordinates, radius_km: f64) -> Heatmap {
    let hotspots: Vec<Hotspot> = ZONES
        .iter()
        .map(|zone| Hotspot {
            name: zone.name,
            latitude: (center.latitude + zone.offset).clamp(-90.0, 90.0),
            longitude: (center.longitude + zone.offset).clamp(-180.0, 180.0),
            density: zone.density,
            reports_last_30_days: zone.reports,
            primary_debris: zone.debris.to_vec(),
        })
        .filter(|hotspot| {
            let distance =
                (hotspot.latitude - center.latitude).hypot(hotspot.longitude - center.longitude);
            distance * KM_PER_DEGREE <= radius_km
        })
        .collect();

    Heatmap {
        center,
        radius_km,
        total_reports: hotspots.iter().map(|h| h.reports_last_30_days).sum(),
        hotspots,
        last_updated: Utc::now(),
    }
}
