//! Système de coordonnées rectangulaires plan du Japon (平面直角座標系)
//!
//! Mercator transverse sur GRS80, facteur d'échelle 0.9999, sans fausse
//! origine. Inversion par les séries de Krüger (formules du GSI, ordre n⁶).
//!
//! Convention : `x` est l'abscisse Est (Y du fichier source), `y` l'ordonnée
//! Nord (X du fichier source).

use super::ellipsoid::GRS80;

/// Facteur d'échelle sur le méridien central
const M0: f64 = 0.9999;

/// Origines des 19 zones (latitude, longitude) en degrés décimaux
const ORIGINS: [(f64, f64); 19] = [
    (33.0, 129.5),
    (33.0, 131.0),
    (36.0, 132.0 + 10.0 / 60.0),
    (33.0, 133.5),
    (36.0, 134.0 + 20.0 / 60.0),
    (36.0, 136.0),
    (36.0, 137.0 + 10.0 / 60.0),
    (36.0, 138.5),
    (36.0, 139.0 + 50.0 / 60.0),
    (40.0, 140.0 + 50.0 / 60.0),
    (44.0, 140.25),
    (44.0, 142.25),
    (44.0, 144.25),
    (26.0, 142.0),
    (26.0, 127.5),
    (26.0, 124.0),
    (26.0, 131.0),
    (20.0, 136.0),
    (26.0, 154.0),
];

/// Projection inverse d'une zone (1..=19), coefficients précalculés
#[derive(Debug, Clone)]
pub struct PlaneRectangular {
    zone: u8,
    lon0: f64,
    /// Rayon rectifiant multiplié par M0
    a_bar: f64,
    /// Arc de méridien de l'origine multiplié par M0
    s_bar0: f64,
    beta: [f64; 5],
    delta: [f64; 6],
}

impl PlaneRectangular {
    /// Construit la projection d'une zone, `None` hors de 1..=19
    pub fn new(zone: u8) -> Option<Self> {
        let (lat0, lon0) = *ORIGINS.get(usize::from(zone).checked_sub(1)?)?;
        let n = GRS80::N;
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let a0 = 1.0 + n2 / 4.0 + n4 / 64.0;
        let arc = [
            -1.5 * (n - n3 / 8.0 - n5 / 64.0),
            15.0 / 16.0 * (n2 - n4 / 4.0),
            -35.0 / 48.0 * (n3 - 5.0 / 16.0 * n5),
            315.0 / 512.0 * n4,
            -693.0 / 1280.0 * n5,
        ];

        let scale = M0 * GRS80::A / (1.0 + n);
        let phi0 = lat0.to_radians();
        let s_bar0 = scale
            * (a0 * phi0
                + arc
                    .iter()
                    .enumerate()
                    .map(|(j, c)| c * (2.0 * (j as f64 + 1.0) * phi0).sin())
                    .sum::<f64>());

        let beta = [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - n4 / 360.0 - 81.0 / 512.0 * n5,
            n2 / 48.0 + n3 / 15.0 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5,
            4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5,
            4583.0 / 161280.0 * n5,
        ];
        let delta = [
            2.0 * n - 2.0 / 3.0 * n2 - 2.0 * n3 + 116.0 / 45.0 * n4 + 26.0 / 45.0 * n5
                - 2854.0 / 675.0 * n6,
            7.0 / 3.0 * n2 - 8.0 / 5.0 * n3 - 227.0 / 45.0 * n4 + 2704.0 / 315.0 * n5
                + 2323.0 / 945.0 * n6,
            56.0 / 15.0 * n3 - 136.0 / 35.0 * n4 - 1262.0 / 105.0 * n5 + 73814.0 / 2835.0 * n6,
            4279.0 / 630.0 * n4 - 332.0 / 35.0 * n5 - 399572.0 / 14175.0 * n6,
            4174.0 / 315.0 * n5 - 144838.0 / 6237.0 * n6,
            601676.0 / 22275.0 * n6,
        ];

        Some(Self {
            zone,
            lon0: lon0.to_radians(),
            a_bar: scale * a0,
            s_bar0,
            beta,
            delta,
        })
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// Convertit (Est, Nord) en mètres vers (longitude, latitude) en degrés
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let xi = (y + self.s_bar0) / self.a_bar;
        let eta = x / self.a_bar;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let lat = chi
            + self
                .delta
                .iter()
                .enumerate()
                .map(|(j, d)| d * (2.0 * (j as f64 + 1.0) * chi).sin())
                .sum::<f64>();
        let lon = self.lon0 + eta_p.sinh().atan2(xi_p.cos());

        (lon.to_degrees(), lat.to_degrees())
    }
}
