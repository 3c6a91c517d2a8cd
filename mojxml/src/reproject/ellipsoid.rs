//! Définition de l'ellipsoïde GRS80 (JGD2000 / JGD2011)

/// Ellipsoïde GRS80
pub struct GRS80;

impl GRS80 {
    /// Demi-grand axe en mètres
    pub const A: f64 = 6378137.0;

    /// Aplatissement
    pub const F: f64 = 1.0 / 298.257222101;

    /// Troisième aplatissement n = f / (2 - f)
    pub const N: f64 = Self::F / (2.0 - Self::F);
}
