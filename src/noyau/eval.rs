//! Noyau : évaluation
//!
//! texte -> jetons -> AST (analyse + validation) -> valeur f64
//!
//! Sémantique (flottants double précision) :
//! - comparaisons et logique rendent 1 ou 0 ; `&&`, `||` et `?:` court-circuitent
//! - bit à bit et décalages sur la troncature entière 64 bits
//! - `%` est le reste flottant (signe du dividende)
//! - NaN / ±inf se propagent, jamais d’erreur de calcul

use log::trace;

use super::analyse::parse;
use super::erreur::Erreur;
use super::expr::{Expr, OpBinaire, OpUnaire};

fn booleen(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

// NaN est “vrai” (seul 0 est faux)
fn vrai(x: f64) -> bool {
    x != 0.0
}

fn entier(x: f64) -> i64 {
    x.trunc() as i64
}

fn decaler_gauche(a: f64, n: f64) -> f64 {
    let n = entier(n);
    u32::try_from(n)
        .ok()
        .and_then(|n| entier(a).checked_shl(n))
        .unwrap_or(0) as f64
}

fn decaler_droite(a: f64, n: f64) -> f64 {
    let a = entier(a);
    u32::try_from(entier(n))
        .ok()
        .and_then(|n| a.checked_shr(n))
        .unwrap_or(if a < 0 { -1 } else { 0 }) as f64
}

fn binaire(op: OpBinaire, a: f64, b: f64) -> f64 {
    use OpBinaire::*;
    match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div => a / b,
        Reste => a % b,
        Puissance => a.powf(b),

        Egal => booleen(a == b),
        Different => booleen(a != b),
        Inferieur => booleen(a < b),
        InferieurEgal => booleen(a <= b),
        Superieur => booleen(a > b),
        SuperieurEgal => booleen(a >= b),

        DecalageGauche => decaler_gauche(a, b),
        DecalageDroite => decaler_droite(a, b),

        EtBit => (entier(a) & entier(b)) as f64,
        OuBit => (entier(a) | entier(b)) as f64,

        // traités avant (court-circuit)
        Et => booleen(vrai(a) && vrai(b)),
        Ou => booleen(vrai(a) || vrai(b)),
    }
}

/// Évalue un AST ; `lookup` résout les variables `{nom}`.
pub fn evaluer(e: &Expr, lookup: &dyn Fn(&str) -> Option<f64>) -> Result<f64, Erreur> {
    use Expr::*;

    let v = match e {
        Nombre(v) => *v,
        Var(nom) => lookup(nom).ok_or_else(|| Erreur::VariableInconnue(nom.clone()))?,

        Unaire(op, x) => {
            let x = evaluer(x, lookup)?;
            match op {
                OpUnaire::Neg => -x,
                OpUnaire::Plus => x,
                OpUnaire::Non => booleen(!vrai(x)),
                OpUnaire::NonBit => !entier(x) as f64,
            }
        }

        Binaire(OpBinaire::Et, a, b) => {
            booleen(vrai(evaluer(a, lookup)?) && vrai(evaluer(b, lookup)?))
        }
        Binaire(OpBinaire::Ou, a, b) => {
            booleen(vrai(evaluer(a, lookup)?) || vrai(evaluer(b, lookup)?))
        }
        Binaire(op, a, b) => binaire(*op, evaluer(a, lookup)?, evaluer(b, lookup)?),

        Condition(c, a, b) => {
            if vrai(evaluer(c, lookup)?) {
                evaluer(a, lookup)?
            } else {
                evaluer(b, lookup)?
            }
        }

        Appel(fonction, args) => {
            let valeurs = args
                .iter()
                .map(|a| evaluer(a, lookup))
                .collect::<Result<Vec<_>, _>>()?;
            fonction.appliquer(&valeurs)
        }
    };

    Ok(v)
}

/// API publique : analyse puis évalue une formule.
pub fn eval_expression(
    texte: &str,
    lookup: &dyn Fn(&str) -> Option<f64>,
) -> Result<f64, Erreur> {
    let e = parse(texte.trim())?;
    trace!("formule {texte:?} -> {e}");
    evaluer(&e, lookup)
}
