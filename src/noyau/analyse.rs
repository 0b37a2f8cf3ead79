// src/noyau/analyse.rs
//
// Jetons -> AST (descente récursive, montée de précédence pour les binaires)
//
// Précédences (de la plus faible à la plus forte) :
//   ?:  ||  &&  |  &  == !=  < <= > >=  << >>  + -  * / %  unaires (- + ! ~)  ^
//
// Règles:
// - `^` est associatif à droite et lie plus fort qu’un unaire à sa gauche : -2^2 = -4
// - Ident(nom) doit être suivi de `(` : c’est un appel, jamais une variable
// - l’arité est vérifiée ici (après les arguments : l’appel le plus interne est signalé en premier)
// - parenthèses nues : exactement un argument non vide
// - profondeur bornée (pas de débordement de pile sur entrée pathologique)

use super::erreur::Erreur;
use super::expr::{Expr, OpBinaire, OpUnaire};
use super::fonctions::Fonction;
use super::jetons::{format_tokens, tokenize, Tok};

/// Imbrication maximale (parenthèses, unaires, exposants, arguments).
pub const MAX_PROFONDEUR: usize = 256;

/// Longueur maximale d’une formule, en jetons (borne aussi la hauteur des chaînes 1+1+…+1).
pub const MAX_JETONS: usize = 4096;

fn precedence(t: &Tok) -> Option<(u8, OpBinaire)> {
    use OpBinaire::*;
    let p = match t {
        Tok::PipePipe => (1, Ou),
        Tok::AmpAmp => (2, Et),
        Tok::Pipe => (3, OuBit),
        Tok::Amp => (4, EtBit),
        Tok::EqEq => (5, Egal),
        Tok::Ne => (5, Different),
        Tok::Lt => (6, Inferieur),
        Tok::Le => (6, InferieurEgal),
        Tok::Gt => (6, Superieur),
        Tok::Ge => (6, SuperieurEgal),
        Tok::Shl => (7, DecalageGauche),
        Tok::Shr => (7, DecalageDroite),
        Tok::Plus => (8, Add),
        Tok::Minus => (8, Sub),
        Tok::Star => (9, Mul),
        Tok::Slash => (9, Div),
        Tok::Percent => (9, Reste),
        _ => return None,
    };
    Some(p)
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Caret | Tok::Question)
}

fn op_unaire(t: &Tok) -> Option<OpUnaire> {
    match t {
        Tok::Minus => Some(OpUnaire::Neg),
        Tok::Plus => Some(OpUnaire::Plus),
        Tok::Bang => Some(OpUnaire::Non),
        Tok::Tilde => Some(OpUnaire::NonBit),
        _ => None,
    }
}

struct Analyseur<'a> {
    jetons: &'a [Tok],
    pos: usize,
    profondeur: usize,
}

impl<'a> Analyseur<'a> {
    fn peek(&self) -> Option<&'a Tok> {
        self.jetons.get(self.pos)
    }

    fn suivant(&mut self) -> Option<&'a Tok> {
        let t = self.jetons.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn attendre(&mut self, attendu: &Tok) -> Result<(), Erreur> {
        match self.suivant() {
            Some(t) if t == attendu => Ok(()),
            Some(t) => Err(Erreur::SyntaxeIllegale(t.to_string())),
            None => Err(fin_inattendue()),
        }
    }

    fn expression(&mut self) -> Result<Expr, Erreur> {
        let c = self.binaire(1)?;

        if self.peek() == Some(&Tok::Question) && is_right_associative(&Tok::Question) {
            self.pos += 1;
            let a = self.expression()?;
            self.attendre(&Tok::Colon)?;
            let b = self.expression()?;
            return Ok(Expr::Condition(Box::new(c), Box::new(a), Box::new(b)));
        }

        Ok(c)
    }

    /// Montée de précédence : binaires associatifs à gauche de niveau >= `min`.
    fn binaire(&mut self, min: u8) -> Result<Expr, Erreur> {
        let mut gauche = self.unaire()?;

        while let Some((p, op)) = self.peek().and_then(precedence) {
            if p < min {
                break;
            }
            self.pos += 1;
            let droite = self.binaire(p + 1)?;
            gauche = Expr::Binaire(op, Box::new(gauche), Box::new(droite));
        }

        Ok(gauche)
    }

    fn unaire(&mut self) -> Result<Expr, Erreur> {
        self.profondeur += 1;
        if self.profondeur > MAX_PROFONDEUR {
            return Err(Erreur::SyntaxeIllegale("formule trop imbriquée".into()));
        }

        // préfixes en boucle (pas de récursion sur "- - - - x")
        let mut ops = Vec::new();
        while let Some(op) = self.peek().and_then(op_unaire) {
            ops.push(op);
            self.pos += 1;
        }

        let mut e = self.puissance();
        if let Ok(x) = e {
            e = Ok(ops
                .into_iter()
                .rev()
                .fold(x, |acc, op| Expr::Unaire(op, Box::new(acc))));
        }

        self.profondeur -= 1;
        e
    }

    fn puissance(&mut self) -> Result<Expr, Erreur> {
        let base = self.primaire()?;

        if self.peek() == Some(&Tok::Caret) {
            self.pos += 1;
            // associatif à droite : l’exposant est un unaire (2^-1, 2^3^2)
            let exposant = self.unaire()?;
            return Ok(Expr::Binaire(
                OpBinaire::Puissance,
                Box::new(base),
                Box::new(exposant),
            ));
        }

        Ok(base)
    }

    fn primaire(&mut self) -> Result<Expr, Erreur> {
        let debut = self.pos;

        match self.suivant() {
            Some(Tok::Num(v)) => Ok(Expr::Nombre(*v)),
            Some(Tok::Placeholder(nom)) => Ok(Expr::Var(nom.clone())),

            Some(Tok::Ident(nom)) => {
                if self.peek() != Some(&Tok::LPar) {
                    return Err(Erreur::SyntaxeIllegale(nom.clone()));
                }
                self.pos += 1;
                let args = self.arguments()?;

                let fonction = Fonction::depuis_nom(nom)
                    .ok_or_else(|| Erreur::FonctionNonSupportee(nom.clone()))?;
                if !fonction.arite().accepte(args.len()) {
                    return Err(Erreur::AriteInvalide {
                        fonction: nom.clone(),
                        arite: fonction.arite(),
                    });
                }
                Ok(Expr::Appel(fonction, args))
            }

            // parenthèses nues : un seul argument, non vide
            Some(Tok::LPar) => {
                let args = self.arguments()?;
                if args.len() != 1 {
                    return Err(Erreur::SyntaxeIllegale(format_tokens(
                        &self.jetons[debut..self.pos],
                    )));
                }
                Ok(args.into_iter().next().unwrap_or(Expr::Nombre(f64::NAN)))
            }

            Some(t) => Err(Erreur::SyntaxeIllegale(t.to_string())),
            None => Err(fin_inattendue()),
        }
    }

    /// Après `(` : liste d’expressions séparées par `,`, jusqu’à `)`.
    fn arguments(&mut self) -> Result<Vec<Expr>, Erreur> {
        let mut args = Vec::new();

        if self.peek() == Some(&Tok::RPar) {
            self.pos += 1;
            return Ok(args);
        }

        loop {
            args.push(self.expression()?);
            match self.suivant() {
                Some(Tok::Comma) => continue,
                Some(Tok::RPar) => return Ok(args),
                Some(t) => return Err(Erreur::SyntaxeIllegale(t.to_string())),
                None => return Err(Erreur::SyntaxeIllegale("parenthèses non fermées".into())),
            }
        }
    }
}

fn fin_inattendue() -> Erreur {
    Erreur::SyntaxeIllegale("fin de formule inattendue".into())
}

/// Construit l’AST d’une suite de jetons complète.
pub fn parse_tokens(jetons: &[Tok]) -> Result<Expr, Erreur> {
    if jetons.is_empty() {
        return Err(Erreur::SyntaxeIllegale("formule vide".into()));
    }
    if jetons.len() > MAX_JETONS {
        return Err(Erreur::SyntaxeIllegale("formule trop longue".into()));
    }

    let mut a = Analyseur {
        jetons,
        pos: 0,
        profondeur: 0,
    };
    let e = a.expression()?;

    // tout doit être consommé : "{a}{b}" est refusé ici
    if a.pos < jetons.len() {
        return Err(Erreur::SyntaxeIllegale(format_tokens(&jetons[a.pos..])));
    }

    Ok(e)
}

/// Tokenize puis construit l’AST.
pub fn parse(s: &str) -> Result<Expr, Erreur> {
    let jetons = tokenize(s)?;
    parse_tokens(&jetons)
}
