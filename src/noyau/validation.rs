// src/noyau/validation.rs
//
// Validation d’une formule sans l’évaluer : même analyse que l’évaluation,
// donc une formule acceptée ici ne peut pas échouer pour une raison de syntaxe.

use super::analyse::parse;
use super::erreur::Erreur;

/// Ok si la formule est syntaxiquement valide (variables non résolues).
pub fn valider_formule(formule: &str) -> Result<(), Erreur> {
    parse(formule.trim()).map(|_| ())
}

/// None si la formule est valide, sinon un message lisible.
pub fn find_formula_errors(formule: &str) -> Option<String> {
    valider_formule(formule).err().map(|e| e.to_string())
}
