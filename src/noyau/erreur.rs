// src/noyau/erreur.rs
//
// Erreurs du noyau (une seule énumération, propagée avec `?`).

use super::fonctions::Arite;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Erreur {
    #[error("base invalide : {0} (attendu entre 2 et 36)")]
    BaseInvalide(u32),

    #[error("la variable {{{nom}}} n’est pas un nombre valide : {valeur:?}")]
    VariableNonNumerique { nom: String, valeur: String },

    #[error("variable inconnue : {{{0}}}")]
    VariableInconnue(String),

    #[error("syntaxe de formule illégale : {0}")]
    SyntaxeIllegale(String),

    #[error("la fonction {fonction} {arite}")]
    AriteInvalide { fonction: String, arite: Arite },

    #[error("fonction non supportée : {0}")]
    FonctionNonSupportee(String),

    #[error("format de nombre invalide : {0:?}")]
    FormatInvalide(String),

    #[error("réglages invalides : {0}")]
    Reglages(String),
}

impl Erreur {
    /// Vrai si l’erreur vient de l’analyse de la formule (avant toute évaluation).
    pub fn est_erreur_de_formule(&self) -> bool {
        matches!(
            self,
            Erreur::SyntaxeIllegale(_)
                | Erreur::AriteInvalide { .. }
                | Erreur::FonctionNonSupportee(_)
        )
    }
}
