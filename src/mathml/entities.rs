//! Named character entities that MathML inherits from HTML but plain XML
//! does not define. Resolved by a pre-pass before the XML parser runs.
//! The list is sorted by name for binary search.

pub const ENTITIES: &[(&str, char)] = &[
    ("Delta", 'Δ'),
    ("Gamma", 'Γ'),
    ("Lambda", 'Λ'),
    ("Omega", 'Ω'),
    ("Phi", 'Φ'),
    ("Pi", 'Π'),
    ("Psi", 'Ψ'),
    ("Sigma", 'Σ'),
    ("Theta", 'Θ'),
    ("Upsilon", 'Υ'),
    ("Xi", 'Ξ'),
    ("alpha", 'α'),
    ("beta", 'β'),
    ("bull", '•'),
    ("cap", '∩'),
    ("cdot", '⋅'),
    ("chi", 'χ'),
    ("cup", '∪'),
    ("dagger", '†'),
    ("darr", '↓'),
    ("delta", 'δ'),
    ("divide", '÷'),
    ("empty", '∅'),
    ("epsilon", 'ε'),
    ("equiv", '≡'),
    ("eta", 'η'),
    ("exist", '∃'),
    ("forall", '∀'),
    ("gamma", 'γ'),
    ("ge", '≥'),
    ("geq", '≥'),
    ("harr", '↔'),
    ("hbar", 'ℏ'),
    ("infin", '∞'),
    ("infty", '∞'),
    ("int", '∫'),
    ("iota", 'ι'),
    ("isin", '∈'),
    ("kappa", 'κ'),
    ("lambda", 'λ'),
    ("langle", '⟨'),
    ("larr", '←'),
    ("lceil", '⌈'),
    ("le", '≤'),
    ("leq", '≤'),
    ("lfloor", '⌊'),
    ("mdash", '—'),
    ("minus", '−'),
    ("mp", '∓'),
    ("mu", 'μ'),
    ("nabla", '∇'),
    ("nbsp", '\u{a0}'),
    ("ndash", '–'),
    ("ne", '≠'),
    ("neq", '≠'),
    ("ni", '∋'),
    ("notin", '∉'),
    ("nu", 'ν'),
    ("omega", 'ω'),
    ("oplus", '⊕'),
    ("otimes", '⊗'),
    ("partial", '∂'),
    ("phi", 'φ'),
    ("pi", 'π'),
    ("pm", '±'),
    ("prod", '∏'),
    ("prop", '∝'),
    ("psi", 'ψ'),
    ("radic", '√'),
    ("rangle", '⟩'),
    ("rarr", '→'),
    ("rceil", '⌉'),
    ("rfloor", '⌋'),
    ("rho", 'ρ'),
    ("sdot", '⋅'),
    ("sigma", 'σ'),
    ("sim", '∼'),
    ("sub", '⊂'),
    ("sube", '⊆'),
    ("sum", '∑'),
    ("sup", '⊃'),
    ("supe", '⊇'),
    ("tau", 'τ'),
    ("theta", 'θ'),
    ("times", '×'),
    ("uarr", '↑'),
    ("upsilon", 'υ'),
    ("varepsilon", 'ϵ'),
    ("varphi", 'ϕ'),
    ("vartheta", 'ϑ'),
    ("xi", 'ξ'),
    ("zeta", 'ζ'),
];

/// Looks up a named entity.
pub fn lookup(name: &str) -> Option<char> {
    ENTITIES
        .binary_search_by(|(n, _)| n.cmp(&name))
        .ok()
        .map(|idx| ENTITIES[idx].1)
}
