///! User-facing text catalog
///!
///! Every string the report, the dashboard image and the error path show
///! comes from here, selected by [`Locale`].

use neo_common::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn title(&self) -> &'static str {
        match self.locale {
            Locale::En => "Asteroid Tracker",
            Locale::Fr => "Suivi des astéroïdes",
        }
    }

    pub fn description(&self) -> &'static str {
        match self.locale {
            Locale::En => "Visualization of near-Earth asteroids based on public data from NASA.",
            Locale::Fr => "Visualisation des astéroïdes géocroiseurs à partir des données publiques de la NASA.",
        }
    }

    /// Quota and date-span reminder, one entry per line.
    pub fn info_note(&self) -> [&'static str; 2] {
        match self.locale {
            Locale::En => [
                "Note: for larger data volumes, use your personal NASA key. Create your key on https://api.nasa.gov",
                "NASA API only allows querying a limited date range (usually up to 7 days).",
            ],
            Locale::Fr => [
                "Note : pour des volumes de données plus importants, utilisez votre clé NASA personnelle. Créez votre clé sur https://api.nasa.gov",
                "L'API de la NASA ne permet d'interroger qu'une plage de dates limitée (généralement 7 jours maximum).",
            ],
        }
    }

    pub fn raw_data_heading(&self) -> &'static str {
        match self.locale {
            Locale::En => "Raw data",
            Locale::Fr => "Données brutes",
        }
    }

    pub fn empty_dataset(&self) -> &'static str {
        match self.locale {
            Locale::En => "No asteroids reported for this period.",
            Locale::Fr => "Aucun astéroïde signalé sur cette période.",
        }
    }

    pub fn chart_heading(&self) -> &'static str {
        match self.locale {
            Locale::En => "Asteroid size by date",
            Locale::Fr => "Taille des astéroïdes par date",
        }
    }

    pub fn chart_title(&self) -> &'static str {
        match self.locale {
            Locale::En => "Near-Earth asteroids",
            Locale::Fr => "Astéroïdes géocroiseurs",
        }
    }

    pub fn chart_x_label(&self) -> &'static str {
        match self.locale {
            Locale::En => "Date of visit",
            Locale::Fr => "Date de passage",
        }
    }

    pub fn chart_y_label(&self) -> &'static str {
        match self.locale {
            Locale::En => "Diameter (m)",
            Locale::Fr => "Diamètre (m)",
        }
    }

    pub fn legend_hazardous(&self) -> &'static str {
        match self.locale {
            Locale::En => "Hazardous",
            Locale::Fr => "Dangereux",
        }
    }

    pub fn legend_safe(&self) -> &'static str {
        match self.locale {
            Locale::En => "Not hazardous",
            Locale::Fr => "Non dangereux",
        }
    }

    pub fn chart_saved(&self, path: &str) -> String {
        match self.locale {
            Locale::En => format!("Dashboard image saved to {}", path),
            Locale::Fr => format!("Image du tableau de bord enregistrée dans {}", path),
        }
    }

    pub fn csv_saved(&self, path: &str) -> String {
        match self.locale {
            Locale::En => format!("Raw data exported to {}", path),
            Locale::Fr => format!("Données brutes exportées dans {}", path),
        }
    }

    pub fn hazard_heading(&self) -> &'static str {
        match self.locale {
            Locale::En => "Dangerous asteroids detected",
            Locale::Fr => "Astéroïdes dangereux détectés",
        }
    }

    pub fn hazards_detected(&self, count: usize) -> String {
        match self.locale {
            Locale::En => format!("{} dangerous asteroids detected ⚠️", count),
            Locale::Fr => format!("{} astéroïdes dangereux détectés ⚠️", count),
        }
    }

    pub fn no_hazards(&self) -> &'static str {
        match self.locale {
            Locale::En => "No dangerous asteroids during this period ✅",
            Locale::Fr => "Aucun astéroïde dangereux sur cette période ✅",
        }
    }

    pub fn quota_exceeded(&self) -> &'static str {
        match self.locale {
            Locale::En => "🚨 API quota reached. Please create your own NASA key to continue.",
            Locale::Fr => "🚨 Quota de l'API atteint. Veuillez créer votre propre clé NASA pour continuer.",
        }
    }

    pub fn http_error(&self, status: u16) -> String {
        match self.locale {
            Locale::En => format!("Error {} while retrieving NASA data.", status),
            Locale::Fr => format!("Erreur {} lors de la récupération des données de la NASA.", status),
        }
    }

    pub fn network_error(&self, detail: &str) -> String {
        match self.locale {
            Locale::En => format!("Network error: {}", detail),
            Locale::Fr => format!("Erreur réseau : {}", detail),
        }
    }

    pub fn malformed_payload(&self) -> &'static str {
        match self.locale {
            Locale::En => "Unexpected error: unknown NASA data format.",
            Locale::Fr => "Erreur inattendue : format de données NASA inconnu.",
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_texts_are_distinct() {
        for locale in [Locale::En, Locale::Fr] {
            let m = Messages::new(locale);
            assert_ne!(m.quota_exceeded(), m.http_error(403));
            assert!(m.http_error(500).contains("500"));
            assert!(m.network_error("request timed out").contains("request timed out"));
            assert_ne!(m.malformed_payload(), m.http_error(500));
        }
    }

    #[test]
    fn test_locales_differ() {
        let en = Messages::new(Locale::En);
        let fr = Messages::new(Locale::Fr);
        assert_ne!(en.title(), fr.title());
        assert_ne!(en.no_hazards(), fr.no_hazards());
        assert!(fr.hazards_detected(3).starts_with("3 "));
    }
}
