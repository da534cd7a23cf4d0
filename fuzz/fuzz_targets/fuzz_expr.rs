#![no_main]
use libfuzzer_sys::fuzz_target;

use arbitrary::Arbitrary;

#[derive(Debug)]
pub struct ExprInput {
    pub expr: String,
}

impl<'a> Arbitrary<'a> for ExprInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let expr = random_closure_string(u)?;
        Ok(ExprInput { expr })
    }
}

const MAX_EXPR_LENGTH: usize = 10000;

// Most interesting input starts with a parameter list, so usually supply one
fn random_closure_string(u: &mut arbitrary::Unstructured) -> arbitrary::Result<String> {
    let with_param: bool = u.arbitrary()?;
    let s: String = u.arbitrary()?;
    let body: String = s.chars().take(MAX_EXPR_LENGTH).collect();
    Ok(if with_param { format!("|o| {body}") } else { body })
}

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = arbitrary::Unstructured::new(data).arbitrary::<ExprInput>() {
        lambda_sql::fuzz_helper::translate_expr(&input.expr);
    }
});
