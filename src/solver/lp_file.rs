//! Reading linear programs written in CPLEX LP format.
//!
//! Only the subset of the format needed for continuous linear programs is supported:
//!
//! * an objective section (`Maximize`/`Minimize`), optionally labelled and possibly spanning
//!   several lines
//! * a `Subject To` section with one (optionally labelled) constraint per line, using `<=`, `>=`
//!   or `=`
//! * a `Bounds` section with one bound per line: `x = v`, `x <= v`, `x >= v`, `l <= x <= u` or
//!   `x free`
//! * `End`
//!
//! Lines starting with `\` are comments. Variables are non-negative unless their bounds say
//! otherwise.
use anyhow::{Context, Result, bail, ensure};
use indexmap::{IndexMap, IndexSet};

/// Whether the objective is to be maximised or minimised
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectiveSense {
    /// Maximise the objective
    Maximise,
    /// Minimise the objective
    Minimise,
}

/// A constraint on a linear combination of variables: `lower <= sum(coeff * var) <= upper`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The constraint's label, if any
    pub name: Option<String>,
    /// Coefficient for each variable in the constraint
    pub terms: IndexMap<String, f64>,
    /// Lower limit (may be negative infinity)
    pub lower: f64,
    /// Upper limit (may be infinity)
    pub upper: f64,
}

/// A linear program read from LP text
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    /// Whether to maximise or minimise
    pub sense: ObjectiveSense,
    /// Objective coefficient for each variable appearing in the objective
    pub objective: IndexMap<String, f64>,
    /// The constraints
    pub rows: Vec<Row>,
    /// Explicit bounds for variables; other variables are bounded by `[0, inf)`
    pub bounds: IndexMap<String, (f64, f64)>,
}

impl LinearProgram {
    /// All variables in order of first appearance (objective, then constraints, then bounds)
    pub fn variables(&self) -> IndexSet<&str> {
        self.objective
            .keys()
            .chain(self.rows.iter().flat_map(|row| row.terms.keys()))
            .chain(self.bounds.keys())
            .map(String::as_str)
            .collect()
    }

    /// The bounds for the given variable
    pub fn bounds_for(&self, var: &str) -> (f64, f64) {
        self.bounds
            .get(var)
            .copied()
            .unwrap_or(DEFAULT_BOUNDS)
    }
}

const DEFAULT_BOUNDS: (f64, f64) = (0.0, f64::INFINITY);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Comparison {
    LessEqual,
    GreaterEqual,
    Equal,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Colon,
    Compare(Comparison),
}

/// The section of the file currently being read
#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Start,
    Objective,
    Constraints,
    Bounds,
    End,
}

/// Split a line of LP text into tokens
fn tokenise(line: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            ':' => {
                tokens.push(Token::Colon);
                i += 1;
            }
            '<' | '>' | '=' => {
                // Accept <, <=, =<, >, >=, => and =
                let next = chars.get(i + 1).copied();
                let (cmp, len) = match (c, next) {
                    ('<', Some('=')) | ('=', Some('<')) => (Comparison::LessEqual, 2),
                    ('>', Some('=')) | ('=', Some('>')) => (Comparison::GreaterEqual, 2),
                    ('<', _) => (Comparison::LessEqual, 1),
                    ('>', _) => (Comparison::GreaterEqual, 1),
                    _ => (Comparison::Equal, 1),
                };
                tokens.push(Token::Compare(cmp));
                i += len;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }

                // Optional exponent, e.g. 1e+09
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }

                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse()
                    .with_context(|| format!("Invalid number: {text}"))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || "_!\"#$%&()/,;?@'`{}|~".contains(c) => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || "_.!\"#$%&()/,;?@'`{}|~".contains(chars[i]))
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => bail!("Unexpected character '{c}'"),
        }
    }

    Ok(tokens)
}

/// Remove a leading `label:` from the tokens, returning the label if present
fn split_label(tokens: &[Token]) -> (Option<String>, &[Token]) {
    match tokens {
        [Token::Ident(name), Token::Colon, rest @ ..] => (Some(name.clone()), rest),
        _ => (None, tokens),
    }
}

/// Read a linear expression such as `- 2 x + 3.5 y + z`, adding terms to `terms`.
///
/// Repeated variables have their coefficients summed.
fn parse_expression(tokens: &[Token], terms: &mut IndexMap<String, f64>) -> Result<()> {
    let mut iter = tokens.iter().peekable();
    while iter.peek().is_some() {
        let mut sign = 1.0;
        while let Some(token @ (Token::Plus | Token::Minus)) = iter.peek() {
            if **token == Token::Minus {
                sign = -sign;
            }
            iter.next();
        }

        let coeff = match iter.peek() {
            Some(Token::Number(value)) => {
                let value = *value;
                iter.next();
                value
            }
            _ => 1.0,
        };

        match iter.next() {
            Some(Token::Ident(var)) => {
                ensure!(
                    !["inf", "infinity", "nan"]
                        .iter()
                        .any(|word| var.eq_ignore_ascii_case(word)),
                    "Invalid variable name: {var}"
                );
                *terms.entry(var.clone()).or_insert(0.0) += sign * coeff;
            }
            Some(token) => bail!("Expected a variable, found {token:?}"),
            None => bail!("Constant terms are not supported"),
        }
    }

    Ok(())
}

/// Read a (possibly signed or infinite) number which makes up the whole of `tokens`
fn parse_value(tokens: &[Token]) -> Result<f64> {
    let mut sign = 1.0;
    let mut rest = tokens;
    while let [token @ (Token::Plus | Token::Minus), tail @ ..] = rest {
        if *token == Token::Minus {
            sign = -sign;
        }
        rest = tail;
    }

    match rest {
        [Token::Number(value)] => Ok(sign * value),
        [Token::Ident(name)]
            if name.eq_ignore_ascii_case("inf") || name.eq_ignore_ascii_case("infinity") =>
        {
            Ok(sign * f64::INFINITY)
        }
        _ => bail!("Expected a number, found {tokens:?}"),
    }
}

/// Split tokens at comparison operators
fn split_comparisons(tokens: &[Token]) -> (Vec<&[Token]>, Vec<Comparison>) {
    let mut parts = Vec::new();
    let mut comparisons = Vec::new();
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if let Token::Compare(cmp) = token {
            parts.push(&tokens[start..i]);
            comparisons.push(*cmp);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);

    (parts, comparisons)
}

/// Read a constraint line
fn parse_row(tokens: &[Token]) -> Result<Row> {
    let (name, tokens) = split_label(tokens);
    let (parts, comparisons) = split_comparisons(tokens);
    ensure!(
        comparisons.len() == 1,
        "Constraint must have exactly one comparison operator"
    );

    let mut terms = IndexMap::new();
    parse_expression(parts[0], &mut terms)?;
    ensure!(!terms.is_empty(), "Constraint has no variables");
    let rhs = parse_value(parts[1])?;
    let (lower, upper) = match comparisons[0] {
        Comparison::LessEqual => (f64::NEG_INFINITY, rhs),
        Comparison::GreaterEqual => (rhs, f64::INFINITY),
        Comparison::Equal => (rhs, rhs),
    };

    Ok(Row {
        name,
        terms,
        lower,
        upper,
    })
}

/// Get the variable name if `tokens` consists of a single identifier
fn as_var(tokens: &[Token]) -> Option<&str> {
    match tokens {
        [Token::Ident(name)] if parse_value(tokens).is_err() => Some(name),
        _ => None,
    }
}

/// Read a bound line and apply it to `bounds`
fn parse_bound(tokens: &[Token], bounds: &mut IndexMap<String, (f64, f64)>) -> Result<()> {
    if let [Token::Ident(var), Token::Ident(keyword)] = tokens
        && keyword.eq_ignore_ascii_case("free")
    {
        bounds.insert(var.clone(), (f64::NEG_INFINITY, f64::INFINITY));
        return Ok(());
    }

    let (parts, comparisons) = split_comparisons(tokens);
    match (parts.as_slice(), comparisons.as_slice()) {
        // x <cmp> v
        ([lhs, rhs], [cmp]) if as_var(lhs).is_some() || as_var(rhs).is_some() => {
            // Normalise `v <cmp> x` to `x <cmp'> v`
            let (var, value, cmp) = match as_var(lhs) {
                Some(var) => (var, parse_value(rhs)?, *cmp),
                None => {
                    let flipped = match cmp {
                        Comparison::LessEqual => Comparison::GreaterEqual,
                        Comparison::GreaterEqual => Comparison::LessEqual,
                        Comparison::Equal => Comparison::Equal,
                    };
                    (as_var(rhs).context("Invalid bound")?, parse_value(lhs)?, flipped)
                }
            };
            let entry = bounds.entry(var.to_string()).or_insert(DEFAULT_BOUNDS);
            match cmp {
                Comparison::LessEqual => entry.1 = value,
                Comparison::GreaterEqual => entry.0 = value,
                Comparison::Equal => *entry = (value, value),
            }
        }
        // l <= x <= u
        ([lhs, mid, rhs], [Comparison::LessEqual, Comparison::LessEqual]) => {
            let var = as_var(mid).context("Invalid bound")?;
            bounds.insert(var.to_string(), (parse_value(lhs)?, parse_value(rhs)?));
        }
        _ => bail!("Invalid bound"),
    }

    Ok(())
}

/// Identify a section header line, if `line` is one
fn section_header(line: &str) -> Option<(Section, Option<ObjectiveSense>)> {
    let normalised = line.split_whitespace().collect::<Vec<_>>().join(" ");
    match normalised.to_ascii_lowercase().as_str() {
        "maximize" | "maximise" | "maximum" | "max" => {
            Some((Section::Objective, Some(ObjectiveSense::Maximise)))
        }
        "minimize" | "minimise" | "minimum" | "min" => {
            Some((Section::Objective, Some(ObjectiveSense::Minimise)))
        }
        "subject to" | "such that" | "st" | "s.t." | "st." => Some((Section::Constraints, None)),
        "bounds" | "bound" => Some((Section::Bounds, None)),
        "end" => Some((Section::End, None)),
        _ => None,
    }
}

/// Read a linear program from LP text
pub fn parse_lp(text: &str) -> Result<LinearProgram> {
    let mut section = Section::Start;
    let mut sense = None;
    let mut objective_tokens = Vec::new();
    let mut rows = Vec::new();
    let mut bounds = IndexMap::new();

    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('\\') {
            continue;
        }

        if let Some((new_section, new_sense)) = section_header(line) {
            ensure!(
                section != Section::End,
                "Line {}: content after End",
                line_idx + 1
            );
            if new_sense.is_some() {
                ensure!(
                    sense.is_none(),
                    "Line {}: more than one objective section",
                    line_idx + 1
                );
                sense = new_sense;
            }
            section = new_section;
            continue;
        }

        let tokens = tokenise(line).with_context(|| format!("Line {}", line_idx + 1))?;
        match section {
            Section::Start => bail!("Line {}: expected an objective section", line_idx + 1),
            Section::Objective => objective_tokens.extend(tokens),
            Section::Constraints => {
                rows.push(parse_row(&tokens).with_context(|| format!("Line {}", line_idx + 1))?);
            }
            Section::Bounds => {
                parse_bound(&tokens, &mut bounds)
                    .with_context(|| format!("Line {}", line_idx + 1))?;
            }
            Section::End => bail!("Line {}: content after End", line_idx + 1),
        }
    }

    ensure!(section == Section::End, "Missing End statement");
    let sense = sense.context("Missing objective section")?;

    let (_, objective_tokens) = split_label(&objective_tokens);
    let mut objective = IndexMap::new();
    parse_expression(objective_tokens, &mut objective).context("Invalid objective")?;

    Ok(LinearProgram {
        sense,
        objective,
        rows,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model};
    use crate::lp::{LpBuilder, OpeningStock};
    use crate::model::Model;
    use rstest::rstest;

    #[test]
    fn test_tokenise() {
        assert_eq!(
            tokenise("c1: - 2.5 x_1 + 1e+3y >= -4").unwrap(),
            [
                Token::Ident("c1".into()),
                Token::Colon,
                Token::Minus,
                Token::Number(2.5),
                Token::Ident("x_1".into()),
                Token::Plus,
                Token::Number(1000.0),
                Token::Ident("y".into()),
                Token::Compare(Comparison::GreaterEqual),
                Token::Minus,
                Token::Number(4.0),
            ]
        );
        assert_eq!(
            tokenise("1000Y_0_0 =< 3").unwrap(),
            [
                Token::Number(1000.0),
                Token::Ident("Y_0_0".into()),
                Token::Compare(Comparison::LessEqual),
                Token::Number(3.0),
            ]
        );
        assert!(tokenise("x * y").is_err());
    }

    #[test]
    fn test_parse_expression() {
        let mut terms = IndexMap::new();
        parse_expression(&tokenise("- 2 x + y - - 3 z + 1 x").unwrap(), &mut terms).unwrap();
        assert_eq!(
            terms,
            IndexMap::from([("x".to_string(), -1.0), ("y".into(), 1.0), ("z".into(), 3.0)])
        );

        let mut terms = IndexMap::new();
        assert_error!(
            parse_expression(&tokenise("x + 3").unwrap(), &mut terms),
            "Constant terms are not supported"
        );

        // Overflowed coefficients must not be read as variables
        for expr in ["x + inf cst", "x - infinity", "NaN + y"] {
            let mut terms = IndexMap::new();
            assert!(parse_expression(&tokenise(expr).unwrap(), &mut terms).is_err());
        }
    }

    #[test]
    fn test_parse_row() {
        let row = parse_row(&tokenise("cap: x + y <= 10").unwrap()).unwrap();
        assert_eq!(row.name.as_deref(), Some("cap"));
        assert_eq!(row.lower, f64::NEG_INFINITY);
        assert_eq!(row.upper, 10.0);

        let row = parse_row(&tokenise("x - y = -4").unwrap()).unwrap();
        assert_eq!(row.name, None);
        assert_eq!((row.lower, row.upper), (-4.0, -4.0));

        let row = parse_row(&tokenise("x >= 2").unwrap()).unwrap();
        assert_eq!((row.lower, row.upper), (2.0, f64::INFINITY));

        assert!(parse_row(&tokenise("x + y").unwrap()).is_err());
        assert!(parse_row(&tokenise("0 <= x <= 1").unwrap()).is_err());
    }

    #[test]
    fn test_parse_bound() {
        let mut bounds = IndexMap::new();
        for line in ["a = 1", "b <= 5", "c >= -2", "-1 <= d <= 1", "e free", "3 >= f"] {
            parse_bound(&tokenise(line).unwrap(), &mut bounds).unwrap();
        }
        assert_eq!(bounds["a"], (1.0, 1.0));
        assert_eq!(bounds["b"], (0.0, 5.0));
        assert_eq!(bounds["c"], (-2.0, f64::INFINITY));
        assert_eq!(bounds["d"], (-1.0, 1.0));
        assert_eq!(bounds["e"], (f64::NEG_INFINITY, f64::INFINITY));
        assert_eq!(bounds["f"], (0.0, 3.0));

        parse_bound(&tokenise("b >= -inf").unwrap(), &mut bounds).unwrap();
        assert_eq!(bounds["b"], (f64::NEG_INFINITY, 5.0));

        assert!(parse_bound(&tokenise("x + y <= 1").unwrap(), &mut bounds).is_err());
    }

    #[test]
    fn test_parse_lp() {
        let text = "\\ A small problem
Maximize
 obj: 3 x + 2 y
  - z
Subject To
 c1: x + y <= 4
 c2: x + 3 y <= 6
Bounds
 z = 1
End
";
        let lp = parse_lp(text).unwrap();
        assert_eq!(lp.sense, ObjectiveSense::Maximise);
        assert_eq!(
            lp.objective,
            IndexMap::from([("x".to_string(), 3.0), ("y".into(), 2.0), ("z".into(), -1.0)])
        );
        assert_eq!(lp.rows.len(), 2);
        assert_eq!(lp.bounds_for("z"), (1.0, 1.0));
        assert_eq!(lp.bounds_for("x"), (0.0, f64::INFINITY));
        assert_eq!(lp.variables().into_iter().collect::<Vec<_>>(), ["x", "y", "z"]);
    }

    #[test]
    fn test_parse_lp_malformed() {
        assert_error!(parse_lp("Maximize\n obj: x\n"), "Missing End statement");
        assert_error!(parse_lp("Subject To\n x <= 1\nEnd\n"), "Missing objective section");
        assert_error!(parse_lp(" x <= 1\nEnd\n"), "Line 1: expected an objective section");
        assert_error!(
            parse_lp("Maximize\n obj: x\nSubject To\n x <= 1 <= 2\nEnd\n"),
            "Line 4"
        );
    }

    #[rstest]
    fn test_parse_built_lp(model: Model) {
        let builder = LpBuilder::new(&model, OpeningStock::Fixed);
        let lp = parse_lp(&builder.build(0, 0)).unwrap();

        assert_eq!(lp.sense, ObjectiveSense::Maximise);
        // Production costs and amortisation are merged into one coefficient
        assert_eq!(lp.objective["X_0_0"], -1.0);
        assert_eq!(lp.objective["Y_1_2"], -0.5);
        assert_eq!(lp.objective["cst"], -10.0);
        assert_eq!(lp.rows.len(), 6);
        assert_eq!(lp.rows[0].name.as_deref(), Some("Capa_0"));
        assert_eq!(lp.rows[2].name.as_deref(), Some("stock_0_0"));
        assert_eq!(lp.rows[2].terms["Y_0_1"], 1.0);
        assert_eq!(lp.rows[2].terms["Y_0_0"], -1.0);
        assert_eq!((lp.rows[2].lower, lp.rows[2].upper), (-10.0, -10.0));
        assert_eq!(lp.bounds_for("cst"), (1.0, 1.0));
        assert_eq!(lp.bounds_for("Y_1_0"), (0.0, 0.0));
        assert_eq!(lp.variables().len(), 11);
    }
}
