//! Binary-to-decimal conversion, demonstrated two ways: a tail-recursive
//! nonterminal threading an accumulator through recursive calls, and a flat
//! iterative loop folding into a closure-captured variable. Run with:
//!
//! ```text
//! cargo run --example demos_binary
//! ```

use parsel::{Grammar, Token, TokenCode, Var, VecTokenStream};

const ZERO: TokenCode = 0;
const ONE: TokenCode = 1;

fn lex(bits: &str) -> VecTokenStream {
    let tokens = bits
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let code = if c == '0' { ZERO } else { ONE };
            Token::new(code, c.to_string(), 1, i as u32 + 1)
        })
        .collect();
    VecTokenStream::new(tokens)
}

fn tail_recursive(bits: &str) -> i32 {
    let g = Grammar::new();
    let digits = g.nonterminal::<i32, i32>("digits");

    let acc_in: Var<i32> = Var::new(0);
    let acc_out: Var<i32> = Var::new(0);
    let bit_text: Var<String> = Var::new(String::new());
    let next_in: Var<i32> = Var::new(0);

    let fold = g.action({
        let acc_in = acc_in.clone();
        let bit_text = bit_text.clone();
        let next_in = next_in.clone();
        move || {
            let bit = if bit_text.get() == "1" { 1 } else { 0 };
            next_in.set(acc_in.get() * 2 + bit);
            true
        }
    });
    let pass_through = g.action({
        let acc_in = acc_in.clone();
        let acc_out = acc_out.clone();
        move || {
            acc_out.set(acc_in.get());
            true
        }
    });

    let tok_bit = g.token_with(ZERO, &bit_text) | g.token_with(ONE, &bit_text);
    let recurse_case = tok_bit & fold & digits.with_io(&next_in, &acc_out).into_expr();
    digits
        .with_io(&acc_in, &acc_out)
        .define(recurse_case | pass_through)
        .expect("digits is defined exactly once with consistent cells");

    let top_in: Var<i32> = Var::new(0);
    let top_out: Var<i32> = Var::new(0);
    let start = digits.with_io(&top_in, &top_out).into_expr();
    let tokens = lex(bits);
    let mut pos = 0;
    let matched = start.parse(&tokens, &mut pos).expect("fuel is not exhausted");
    assert!(matched && pos == bits.len(), "malformed bit string: {bits}");
    top_out.get()
}

fn iterative(bits: &str) -> i32 {
    let g = Grammar::new();
    let acc: Var<i32> = Var::new(0);
    let bit_text: Var<String> = Var::new(String::new());
    let fold = g.action({
        let acc = acc.clone();
        let bit_text = bit_text.clone();
        move || {
            let bit = if bit_text.get() == "1" { 1 } else { 0 };
            acc.set(acc.get() * 2 + bit);
            true
        }
    });
    let tok_bit = g.token_with(ZERO, &bit_text) | g.token_with(ONE, &bit_text);
    let start = (tok_bit & fold).star();

    let tokens = lex(bits);
    let mut pos = 0;
    let matched = start.parse(&tokens, &mut pos).expect("fuel is not exhausted");
    assert!(matched && pos == bits.len(), "malformed bit string: {bits}");
    acc.get()
}

fn main() {
    env_logger::init();
    for bits in ["0", "1", "1011", "100000", "11111111"] {
        println!(
            "{bits:>12} -> tail-recursive {:<6} iterative {}",
            tail_recursive(bits),
            iterative(bits)
        );
    }
}
