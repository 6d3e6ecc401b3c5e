use rayon::prelude::*;

use crate::globe::Country;

/// A single land dot with the country it fell inside, if any.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub lon: f64,
    pub lat: f64,
    pub country: Option<u16>,
}

/// Sample a regular lon/lat grid and keep the points that land on a
/// country polygon. Point-in-polygon over every ring is the expensive
/// part, so latitude bands are tested in parallel.
pub fn build_land_particles(countries: &[Country], step_deg: f64) -> Vec<Particle> {
    let step = step_deg.max(0.25);
    let lat_steps = (170.0 / step) as i64;
    let lon_steps = (360.0 / step) as i64;

    (0..=lat_steps)
        .into_par_iter()
        .flat_map_iter(|i| {
            let lat = -85.0 + i as f64 * step;
            // Stagger alternate rows for a less grid-like texture
            let offset = if i % 2 == 0 { 0.0 } else { step / 2.0 };
            (0..lon_steps).filter_map(move |j| {
                let lon = -180.0 + j as f64 * step + offset;
                countries
                    .iter()
                    .position(|c| c.contains(lon, lat))
                    .map(|idx| Particle {
                        lon,
                        lat,
                        country: Some(idx as u16),
                    })
            })
        })
        .collect()
}
