// src/noyau/config.rs
//
// Réglages d’affichage, toujours passés explicitement (aucun état global).
// Désérialisables depuis la configuration JSON de l’hôte ; champs absents = valeurs par défaut.

use serde::{Deserialize, Serialize};

use super::erreur::Erreur;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reglages {
    /// Un seul caractère (`.` ou `,` en pratique).
    pub separateur_decimal: String,
    /// Remplace le marqueur de groupe quand on groupe par 3 (peut être vide).
    pub separateur_milliers: String,
    /// Masquage “chiffres exacts” pour les bases 2, 8 et 16.
    pub chiffres_exacts: bool,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            separateur_decimal: ".".into(),
            separateur_milliers: ",".into(),
            chiffres_exacts: false,
        }
    }
}

impl Reglages {
    pub fn new(separateur_decimal: &str, separateur_milliers: &str) -> Self {
        Self {
            separateur_decimal: separateur_decimal.into(),
            separateur_milliers: separateur_milliers.into(),
            ..Self::default()
        }
    }

    pub fn exacts(mut self, chiffres_exacts: bool) -> Self {
        self.chiffres_exacts = chiffres_exacts;
        self
    }

    /// Le séparateur décimal comme caractère (déjà validé).
    pub fn point_decimal(&self) -> char {
        self.separateur_decimal.chars().next().unwrap_or('.')
    }

    pub fn valider(&self) -> Result<(), Erreur> {
        if self.separateur_decimal.chars().count() != 1 {
            return Err(Erreur::Reglages(format!(
                "le séparateur décimal doit être un seul caractère : {:?}",
                self.separateur_decimal
            )));
        }
        if self.separateur_decimal == self.separateur_milliers {
            return Err(Erreur::Reglages(format!(
                "séparateurs décimal et des milliers identiques : {:?}",
                self.separateur_decimal
            )));
        }
        Ok(())
    }

    /// Lit et valide des réglages JSON.
    pub fn depuis_json(json: &str) -> Result<Self, Erreur> {
        let r: Reglages = serde_json::from_str(json)
            .map_err(|e| Erreur::Reglages(format!("JSON invalide : {e}")))?;
        r.valider()?;
        Ok(r)
    }
}
