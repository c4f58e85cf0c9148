//! End-to-end scenarios exercising the combinator algebra and the
//! recognition engine together: binary-to-decimal (tail-recursive and
//! iterative accumulators), a four-operator arithmetic grammar with
//! operator precedence, counting repeated tokens, a negative-lookahead
//! guard, and a semantic action that rejects an otherwise-matching parse.

use parsel::{Grammar, Token, TokenCode, Var, VecTokenStream};

const NUM: TokenCode = 1;
const PLUS: TokenCode = 2;
const MINUS: TokenCode = 3;
const STAR: TokenCode = 4;
const SLASH: TokenCode = 5;
const LPAREN: TokenCode = 6;
const RPAREN: TokenCode = 7;
const ZERO: TokenCode = 8;
const ONE: TokenCode = 9;
const A: TokenCode = 10;
const B: TokenCode = 11;

fn lex_arith(s: &str) -> VecTokenStream {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    let mut col = 1u32;
    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' => {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::new(NUM, num, 1, col));
                continue;
            }
            '+' => tokens.push(Token::new(PLUS, "+", 1, col)),
            '-' => tokens.push(Token::new(MINUS, "-", 1, col)),
            '*' => tokens.push(Token::new(STAR, "*", 1, col)),
            '/' => tokens.push(Token::new(SLASH, "/", 1, col)),
            '(' => tokens.push(Token::new(LPAREN, "(", 1, col)),
            ')' => tokens.push(Token::new(RPAREN, ")", 1, col)),
            _ => {}
        }
        chars.next();
        col += 1;
    }
    VecTokenStream::new(tokens)
}

fn lex_bits(bits: &str) -> VecTokenStream {
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

/// `digits(acc_in) >> acc_out`: consume one bit, fold it into the
/// accumulator, and recurse -- or, at the end of input, pass the
/// accumulator straight through. The recursive call's output is wired
/// directly to this call's own output, which is the tail-recursive
/// accumulator pattern the attribute-flow machinery is built to support.
fn binary_tail_recursive(bits: &str) -> i32 {
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
        .unwrap();

    let top_in: Var<i32> = Var::new(0);
    let top_out: Var<i32> = Var::new(0);
    let start = digits.with_io(&top_in, &top_out).into_expr();
    let tokens = lex_bits(bits);
    let mut pos = 0;
    assert!(start.parse(&tokens, &mut pos).unwrap());
    assert_eq!(pos, bits.len());
    top_out.get()
}

/// The same conversion with a flat `*` loop over a closure-captured
/// accumulator instead of recursion.
fn binary_iterative(bits: &str) -> i32 {
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

    let tokens = lex_bits(bits);
    let mut pos = 0;
    assert!(start.parse(&tokens, &mut pos).unwrap());
    assert_eq!(pos, bits.len());
    acc.get()
}

#[test]
fn binary_to_decimal_tail_recursive() {
    assert_eq!(binary_tail_recursive("1011"), 11);
    assert_eq!(binary_tail_recursive("0"), 0);
    assert_eq!(binary_tail_recursive("100000"), 32);
}

#[test]
fn binary_to_decimal_iterative() {
    assert_eq!(binary_iterative("1011"), 11);
    assert_eq!(binary_iterative("0"), 0);
    assert_eq!(binary_iterative("100000"), 32);
}

fn eval(expr: &str) -> i32 {
    let g = Grammar::new();
    let expr_nt = g.nonterminal::<(), i32>("expr");
    let term = g.nonterminal::<(), i32>("term");
    let factor = g.nonterminal::<(), i32>("factor");

    // factor = NUM | '(' expr ')'
    let factor_out: Var<i32> = Var::new(0);
    let factor_body = g.token_with(NUM, &factor_out)
        | (g.token(LPAREN) & expr_nt.with_output(&factor_out).into_expr() & g.token(RPAREN));
    factor.with_output(&factor_out).define(factor_body).unwrap();

    // term = factor (('*' | '/') factor)*
    let term_out: Var<i32> = Var::new(0);
    let term_rhs: Var<i32> = Var::new(0);
    let first_factor = factor.with_output(&term_out).into_expr();
    let mul_step = g.token(STAR) & factor.with_output(&term_rhs).into_expr() & g.action({
        let term_out = term_out.clone();
        let term_rhs = term_rhs.clone();
        move || {
            term_out.set(term_out.get() * term_rhs.get());
            true
        }
    });
    let div_step = g.token(SLASH) & factor.with_output(&term_rhs).into_expr() & g.action({
        let term_out = term_out.clone();
        let term_rhs = term_rhs.clone();
        move || {
            term_out.set(term_out.get() / term_rhs.get());
            true
        }
    });
    term.with_output(&term_out)
        .define(first_factor & (mul_step | div_step).star())
        .unwrap();

    // expr = term (('+' | '-') term)*
    let expr_out: Var<i32> = Var::new(0);
    let expr_rhs: Var<i32> = Var::new(0);
    let first_term = term.with_output(&expr_out).into_expr();
    let add_step = g.token(PLUS) & term.with_output(&expr_rhs).into_expr() & g.action({
        let expr_out = expr_out.clone();
        let expr_rhs = expr_rhs.clone();
        move || {
            expr_out.set(expr_out.get() + expr_rhs.get());
            true
        }
    });
    let sub_step = g.token(MINUS) & term.with_output(&expr_rhs).into_expr() & g.action({
        let expr_out = expr_out.clone();
        let expr_rhs = expr_rhs.clone();
        move || {
            expr_out.set(expr_out.get() - expr_rhs.get());
            true
        }
    });
    expr_nt
        .with_output(&expr_out)
        .define(first_term & (add_step | sub_step).star())
        .unwrap();

    let result: Var<i32> = Var::new(0);
    let start = expr_nt.with_output(&result).into_expr();
    let tokens = lex_arith(expr);
    let mut pos = 0;
    assert!(start.parse(&tokens, &mut pos).unwrap());
    result.get()
}

#[test]
fn arithmetic_respects_operator_precedence() {
    assert_eq!(eval("4+3*2"), 10);
    assert_eq!(eval("(7-2)/5"), 1);
}

#[test]
fn counts_repeated_tokens_before_a_terminator() {
    let g = Grammar::new();
    let count: Var<i32> = Var::new(0);
    let bump = g.action({
        let count = count.clone();
        move || {
            count.set(count.get() + 1);
            true
        }
    });
    let start = (g.token(A) & bump).star() & g.token(B);

    let tokens = VecTokenStream::from_codes([(A, "a"), (A, "a"), (A, "a"), (A, "a"), (B, "b")]);
    let mut pos = 0;
    assert!(start.parse(&tokens, &mut pos).unwrap());
    assert_eq!(count.get(), 4);
}

#[test]
fn negative_lookahead_guards_quit() {
    // `A` not immediately followed by `B` ("quit") is accepted; `A` followed
    // by `B` is rejected, and rejection never consumes input.
    let g = Grammar::new();
    let start = g.token(A) & !g.token(B);

    let continues = VecTokenStream::from_codes([(A, "a"), (NUM, "1")]);
    let mut pos = 0;
    assert!(start.parse(&continues, &mut pos).unwrap());
    assert_eq!(pos, 1);

    let quits = VecTokenStream::from_codes([(A, "a"), (B, "b")]);
    let mut pos = 0;
    assert!(!start.parse(&quits, &mut pos).unwrap());
    assert_eq!(pos, 0);
}

#[test]
fn action_driven_rejection() {
    // A digit token is matched, but an action rejects odd values -- the
    // same "this sub-match did not happen" signal a terminal mismatch
    // gives, indistinguishable to anything above it.
    let g = Grammar::new();
    let value: Var<i32> = Var::new(0);
    let even_only = g.token_with(NUM, &value) & g.action({
        let value = value.clone();
        move || value.get() % 2 == 0
    });

    let tokens = VecTokenStream::from_codes([(NUM, "4")]);
    let mut pos = 0;
    assert!(even_only.parse(&tokens, &mut pos).unwrap());

    let tokens = VecTokenStream::from_codes([(NUM, "3")]);
    let mut pos = 0;
    assert!(!even_only.parse(&tokens, &mut pos).unwrap());
    assert_eq!(pos, 0);
}
