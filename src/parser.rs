//! Recursive-descent parser for the scene-script grammar.
//!
//! The parser owns a cursor into the scanner's token sequence and builds the
//! syntax tree in a single pass. The first grammar violation aborts the
//! whole parse; there is no recovery or resynchronization.

use crate::ast::{
    BinaryOp, Clip, DirectiveKind, Expression, Instruction, Scene, Script, Statement, UnaryOp,
    Value,
};
use crate::error::SyntaxError;
use crate::token::{Kind, Token};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// `tokens` must be the scanner's output: non-empty and terminated by
    /// exactly one `Eof` token.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(mut self) -> Result<Script, SyntaxError> {
        // Anything before the first scene heading is front matter and is
        // skipped without inspection.
        while !self.is_at_end() && !self.check(Kind::Scene) {
            self.advance();
        }

        let mut scenes: Vec<Scene> = Vec::new();
        while !self.is_at_end() {
            let heading_line = self.peek().line;
            let scene = self.scene()?;
            if scenes.iter().any(|s| s.name == scene.name) {
                return Err(SyntaxError::new(
                    format!("duplicate scene name '{}'", scene.name),
                    scene.name,
                    heading_line,
                ));
            }
            scenes.push(scene);
        }
        Ok(Script { scenes })
    }

    fn scene(&mut self) -> Result<Scene, SyntaxError> {
        self.consume(Kind::Scene, "expected 'scene' keyword")?;
        self.consume(Kind::Colon, "expected ':' after 'scene'")?;
        let name = self.consume(Kind::Identifier, "expected a scene name after 'scene:'")?;

        let mut statements = Vec::new();
        let mut clips: Vec<Clip> = Vec::new();
        loop {
            match self.peek().kind {
                Kind::LBracket => statements.push(self.bracket_statement()?),
                Kind::Option => statements.push(self.option_statement()?),
                Kind::Clip => {
                    let heading_line = self.peek().line;
                    let clip = self.clip()?;
                    if clips.iter().any(|c| c.name == clip.name) {
                        return Err(SyntaxError::new(
                            format!("duplicate clip name '{}' in scene '{}'", clip.name, name.literal),
                            clip.name,
                            heading_line,
                        ));
                    }
                    clips.push(clip);
                }
                Kind::Scene | Kind::Eof => break,
                _ => {
                    return Err(SyntaxError::from_token(
                        self.peek(),
                        "expected a bracketed statement, 'clip:', or 'option:' in the scene body",
                    ))
                }
            }
        }

        Ok(Scene {
            name: name.literal,
            statements,
            clips,
        })
    }

    fn clip(&mut self) -> Result<Clip, SyntaxError> {
        self.consume(Kind::Clip, "expected 'clip' keyword")?;
        self.consume(Kind::Colon, "expected ':' after 'clip'")?;
        let name = self.consume(Kind::Identifier, "expected a clip name after 'clip:'")?;

        let mut statements = Vec::new();
        loop {
            match self.peek().kind {
                Kind::LBracket => statements.push(self.bracket_statement()?),
                Kind::Option => statements.push(self.option_statement()?),
                Kind::Identifier => statements.push(self.character_direction()?),
                Kind::Scene | Kind::Clip | Kind::Eof => break,
                _ => {
                    return Err(SyntaxError::from_token(
                        self.peek(),
                        "expected a bracketed statement, character direction, or 'option:' in the clip body",
                    ))
                }
            }
        }

        Ok(Clip {
            name: name.literal,
            statements,
        })
    }

    /// `"[" inner-stmt "]"` — the only statement form shared by scene and
    /// clip bodies.
    fn bracket_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.consume(Kind::LBracket, "expected '['")?;
        let statement = self.inner_statement()?;
        self.consume(Kind::RBracket, "expected ']' at end of statement")?;
        Ok(statement)
    }

    fn inner_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.peek().kind {
            Kind::If => self.if_statement(),
            Kind::Set => self.set_statement(),
            kind if kind.is_directive() => self.directive(),
            _ => Err(SyntaxError::from_token(
                self.peek(),
                "expected 'if', 'set', or a directive keyword inside '[...]'",
            )),
        }
    }

    fn if_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.consume(Kind::If, "expected 'if'")?;
        let condition = self.expression()?;
        self.consume(Kind::Then, "expected 'then' after condition")?;
        let then_branch = self.statement_list()?;
        let else_branch = if self.matches(Kind::Else) {
            Some(self.statement_list()?)
        } else {
            None
        };
        Ok(Statement::Conditional {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `inner-stmt (";" inner-stmt)*` — at least one statement, so an `if`
    /// branch can never be empty.
    fn statement_list(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut statements = vec![self.inner_statement()?];
        while self.matches(Kind::Semi) {
            statements.push(self.inner_statement()?);
        }
        Ok(statements)
    }

    fn set_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.consume(Kind::Set, "expected 'set'")?;
        let target = self.consume(Kind::Identifier, "expected a variable name after 'set'")?;
        self.consume(Kind::To, "expected 'to' after the variable name")?;
        let value = self.expression()?;
        Ok(Statement::Assign {
            target: target.literal,
            value,
        })
    }

    fn directive(&mut self) -> Result<Statement, SyntaxError> {
        let keyword_token = self.advance().clone();
        let keyword = match keyword_token.kind {
            Kind::Location => DirectiveKind::Location,
            Kind::Music => DirectiveKind::Music,
            Kind::Sound => DirectiveKind::Sound,
            Kind::Load => DirectiveKind::Load,
            Kind::Jump => DirectiveKind::Jump,
            Kind::Note => DirectiveKind::Note,
            _ => {
                return Err(SyntaxError::from_token(
                    &keyword_token,
                    "expected a directive keyword",
                ))
            }
        };
        if matches!(self.peek().kind, Kind::RBracket | Kind::Eof) {
            return Err(SyntaxError::from_token(
                self.peek(),
                format!("expected an argument after '{}'", keyword_token.literal),
            ));
        }
        let argument = self.advance().clone();
        Ok(Statement::Directive { keyword, argument })
    }

    /// `"option" ":" text "jump" identifier`
    fn option_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.consume(Kind::Option, "expected 'option'")?;
        self.consume(Kind::Colon, "expected ':' after 'option'")?;
        let text = self.consume(Kind::Text, "expected quoted display text after 'option:'")?;
        self.consume(Kind::Jump, "expected 'jump' after the option text")?;
        let target = self.consume(Kind::Identifier, "expected a jump target after 'jump'")?;
        Ok(Statement::Option {
            display_text: text.literal,
            jump_target: target.literal,
        })
    }

    /// `identifier ("looks"|"enters"|"moves"|"turns") [direction] [stage-position]`
    ///
    /// Only `enters` is a reserved word; the other instructions arrive as
    /// plain identifiers and are matched by literal.
    fn character_direction(&mut self) -> Result<Statement, SyntaxError> {
        let character = self.consume(Kind::Identifier, "expected a character name")?;

        let instruction = match self.peek().kind {
            Kind::Enters => {
                self.advance();
                Instruction::Enters
            }
            Kind::Identifier => {
                let literal = self.peek().literal.clone();
                match literal.as_str() {
                    "looks" => {
                        self.advance();
                        Instruction::Looks
                    }
                    "moves" => {
                        self.advance();
                        Instruction::Moves
                    }
                    "turns" => {
                        self.advance();
                        Instruction::Turns
                    }
                    _ => {
                        return Err(SyntaxError::from_token(
                            self.peek(),
                            format!(
                                "unrecognized instruction for character '{}'",
                                character.literal
                            ),
                        ))
                    }
                }
            }
            _ => {
                return Err(SyntaxError::from_token(
                    self.peek(),
                    format!("unrecognized instruction for character '{}'", character.literal),
                ))
            }
        };

        let mut args = Vec::new();
        if self.peek().kind.is_direction() {
            args.push(self.advance().clone());
        }
        if self.peek().kind.is_stage_position() {
            args.push(self.advance().clone());
        }

        Ok(Statement::Direction {
            character: character.literal,
            instruction,
            args,
        })
    }

    // Expressions, by ascending precedence: additive < multiplicative <
    // exponent (right-associative) < unary < primary.

    fn expression(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.term()?;
        loop {
            let operator = match self.peek().kind {
                Kind::Add => BinaryOp::Add,
                Kind::Subtract => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            left = Expression::binary(left, operator, right);
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expression, SyntaxError> {
        let mut left = self.power()?;
        loop {
            let operator = match self.peek().kind {
                Kind::Multiply => BinaryOp::Multiply,
                Kind::Div => BinaryOp::Div,
                Kind::Mod => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.power()?;
            left = Expression::binary(left, operator, right);
        }
        Ok(left)
    }

    fn power(&mut self) -> Result<Expression, SyntaxError> {
        let base = self.unary()?;
        if self.matches(Kind::Exp) {
            let exponent = self.power()?;
            return Ok(Expression::binary(base, BinaryOp::Exp, exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Expression, SyntaxError> {
        if self.matches(Kind::Subtract) {
            let operand = self.unary()?;
            return Ok(Expression::unary(UnaryOp::Negate, operand));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression, SyntaxError> {
        match self.peek().kind {
            Kind::Number => {
                let token = self.advance();
                Ok(Expression::Literal(Value::Number(
                    token.value.unwrap_or_default(),
                )))
            }
            Kind::Text => {
                let token = self.advance().clone();
                Ok(Expression::Literal(Value::Text(token.literal)))
            }
            Kind::Identifier => {
                let token = self.advance().clone();
                Ok(Expression::Reference(token.literal))
            }
            Kind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(Kind::RParen, "expected ')' after expression")?;
                Ok(Expression::group(inner))
            }
            _ => Err(SyntaxError::from_token(
                self.peek(),
                "expected a number, string, name, or parenthesized expression",
            )),
        }
    }

    // Cursor plumbing. The token sequence itself is never mutated.

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: Kind) -> bool {
        self.peek().kind == kind
    }

    fn matches(&mut self, kind: Kind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn consume(&mut self, kind: Kind, message: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(SyntaxError::from_token(self.peek(), message))
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == Kind::Eof
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::ast::{
        BinaryOp, DirectiveKind, Expression, Instruction, Statement, UnaryOp, Value,
    };
    use crate::error::SyntaxError;
    use crate::lexer::Scanner;
    use crate::token::Kind;

    fn parse(source: &str) -> Result<crate::ast::Script, SyntaxError> {
        let tokens = Scanner::new(source).tokenize().expect("lexing failed");
        Parser::new(tokens).parse()
    }

    /// Parse `source` wrapped in a one-scene script and return that scene's
    /// first statement.
    fn first_statement(body: &str) -> Statement {
        let script = parse(&format!("scene: s\n{body}\n")).expect("parse failed");
        script.scenes[0].statements[0].clone()
    }

    fn assigned_expression(body: &str) -> Expression {
        match first_statement(body) {
            Statement::Assign { value, .. } => value,
            other => panic!("expected an assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_single_scene_with_assignment() {
        let script = parse("scene: intro\n[set x to 5]\n").unwrap();
        assert_eq!(script.len(), 1);
        let scene = script.scene("intro").unwrap();
        assert_eq!(
            scene.statements,
            vec![Statement::Assign {
                target: "x".into(),
                value: Expression::number(5.0),
            }]
        );
        assert!(scene.clips.is_empty());
    }

    #[test]
    fn test_empty_source_is_empty_script() {
        let script = parse("").unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_front_matter_is_skipped() {
        let script = parse("a stage play\nby nobody in particular\n\nscene: one\n[set x to 1]\n").unwrap();
        assert_eq!(script.len(), 1);
        assert!(script.scene("one").is_some());
    }

    #[test]
    fn test_additive_binds_looser_than_multiplicative() {
        let expr = assigned_expression("[set x to 2 + 3 * 4]");
        assert_eq!(
            expr,
            Expression::binary(
                Expression::number(2.0),
                BinaryOp::Add,
                Expression::binary(
                    Expression::number(3.0),
                    BinaryOp::Multiply,
                    Expression::number(4.0)
                ),
            )
        );
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let expr = assigned_expression("[set x to 2 ** 3 ** 2]");
        assert_eq!(
            expr,
            Expression::binary(
                Expression::number(2.0),
                BinaryOp::Exp,
                Expression::binary(
                    Expression::number(3.0),
                    BinaryOp::Exp,
                    Expression::number(2.0)
                ),
            )
        );
    }

    #[test]
    fn test_exponent_binds_tighter_than_term() {
        let expr = assigned_expression("[set x to 2 * 3 ** 2]");
        assert_eq!(
            expr,
            Expression::binary(
                Expression::number(2.0),
                BinaryOp::Multiply,
                Expression::binary(
                    Expression::number(3.0),
                    BinaryOp::Exp,
                    Expression::number(2.0)
                ),
            )
        );
    }

    #[test]
    fn test_unary_minus() {
        let expr = assigned_expression("[set x to -y + 1]");
        assert_eq!(
            expr,
            Expression::binary(
                Expression::unary(UnaryOp::Negate, Expression::reference("y")),
                BinaryOp::Add,
                Expression::number(1.0),
            )
        );
    }

    #[test]
    fn test_grouping() {
        let expr = assigned_expression("[set x to (2 + 3) * 4]");
        assert_eq!(
            expr,
            Expression::binary(
                Expression::group(Expression::binary(
                    Expression::number(2.0),
                    BinaryOp::Add,
                    Expression::number(3.0)
                )),
                BinaryOp::Multiply,
                Expression::number(4.0),
            )
        );
    }

    #[test]
    fn test_string_literal_assignment() {
        let stmt = first_statement("[set greeting to \"good evening\"]");
        assert_eq!(
            stmt,
            Statement::Assign {
                target: "greeting".into(),
                value: Expression::Literal(Value::Text("good evening".into())),
            }
        );
    }

    #[test]
    fn test_conditional_without_else() {
        let stmt = first_statement("[if x then set y to 1]");
        assert_eq!(
            stmt,
            Statement::Conditional {
                condition: Expression::reference("x"),
                then_branch: vec![Statement::Assign {
                    target: "y".into(),
                    value: Expression::number(1.0),
                }],
                else_branch: None,
            }
        );
    }

    #[test]
    fn test_conditional_with_statement_lists() {
        let stmt =
            first_statement("[if x - 1 then set y to 1; set z to 2 else set y to 0]");
        match stmt {
            Statement::Conditional {
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 2);
                assert_eq!(else_branch.expect("missing else branch").len(), 1);
            }
            other => panic!("expected a conditional, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_then_branch_is_rejected() {
        let err = parse("scene: s\n[if x then]\n").unwrap_err();
        assert!(err.message.contains("expected 'if', 'set', or a directive"));
    }

    #[test]
    fn test_directives() {
        let test_cases = vec![
            ("[location garden]", DirectiveKind::Location, Kind::Identifier),
            ("[music \"tempest.ogg\"]", DirectiveKind::Music, Kind::Text),
            ("[sound \"thunder.ogg\"]", DirectiveKind::Sound, Kind::Text),
            ("[load island]", DirectiveKind::Load, Kind::Identifier),
            ("[jump finale]", DirectiveKind::Jump, Kind::Identifier),
            ("[note \"hold on the close-up\"]", DirectiveKind::Note, Kind::Text),
        ];

        for (body, expected_keyword, expected_arg_kind) in test_cases {
            match first_statement(body) {
                Statement::Directive { keyword, argument } => {
                    assert_eq!(keyword, expected_keyword, "body: {body}");
                    assert_eq!(argument.kind, expected_arg_kind, "body: {body}");
                }
                other => panic!("expected a directive for {body}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_directive_requires_argument() {
        let err = parse("scene: s\n[music]\n").unwrap_err();
        assert!(err.message.contains("expected an argument after 'music'"));
    }

    #[test]
    fn test_option_in_scene_body() {
        let stmt = first_statement("option: \"Ask about the storm\" jump storm");
        assert_eq!(
            stmt,
            Statement::Option {
                display_text: "Ask about the storm".into(),
                jump_target: "storm".into(),
            }
        );
    }

    #[test]
    fn test_clip_with_character_directions() {
        let script = parse(
            "scene: shore\n\
             clip: arrival\n\
             miranda enters left far_left\n\
             prospero looks\n\
             ariel moves middle\n\
             caliban turns right\n\
             [sound \"waves.ogg\"]\n",
        )
        .unwrap();

        let clip = script.scene("shore").unwrap().clip("arrival").unwrap();
        assert_eq!(clip.statements.len(), 5);

        match &clip.statements[0] {
            Statement::Direction {
                character,
                instruction,
                args,
            } => {
                assert_eq!(character, "miranda");
                assert_eq!(*instruction, Instruction::Enters);
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].kind, Kind::Left);
                assert_eq!(args[1].kind, Kind::FarLeft);
            }
            other => panic!("expected a direction, got {other:?}"),
        }

        match &clip.statements[1] {
            Statement::Direction {
                instruction, args, ..
            } => {
                assert_eq!(*instruction, Instruction::Looks);
                assert!(args.is_empty());
            }
            other => panic!("expected a direction, got {other:?}"),
        }

        match &clip.statements[2] {
            Statement::Direction {
                instruction, args, ..
            } => {
                assert_eq!(*instruction, Instruction::Moves);
                assert_eq!(args.len(), 1);
                assert_eq!(args[0].kind, Kind::Middle);
            }
            other => panic!("expected a direction, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_instruction() {
        let err = parse("scene: s\nclip: c\nmiranda sings\n").unwrap_err();
        assert!(err.message.contains("unrecognized instruction"));
        assert_eq!(err.found, "sings");
    }

    #[test]
    fn test_character_direction_outside_clip_is_rejected() {
        let err = parse("scene: s\nmiranda enters\n").unwrap_err();
        assert!(err
            .message
            .contains("expected a bracketed statement, 'clip:', or 'option:'"));
    }

    #[test]
    fn test_structural_keyword_inside_brackets_is_rejected() {
        let err = parse("scene: s\n[scene intro]\n").unwrap_err();
        assert!(err.message.contains("expected 'if', 'set', or a directive"));
    }

    #[test]
    fn test_unmatched_bracket_fails_at_end_of_input() {
        let err = parse("scene: s\n[set x to 5\n").unwrap_err();
        assert_eq!(err.message, "expected ']' at end of statement");
        assert_eq!(err.found, "end of script");
    }

    #[test]
    fn test_missing_colon_after_scene() {
        let err = parse("scene intro\n").unwrap_err();
        assert_eq!(err.message, "expected ':' after 'scene'");
        assert_eq!(err.found, "intro");
    }

    #[test]
    fn test_duplicate_scene_name_is_rejected() {
        let err = parse("scene: a\n[set x to 1]\nscene: a\n[set x to 2]\n").unwrap_err();
        assert_eq!(err.message, "duplicate scene name 'a'");
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_duplicate_clip_name_is_rejected() {
        let err = parse("scene: s\nclip: c\nclip: c\n").unwrap_err();
        assert_eq!(err.message, "duplicate clip name 'c' in scene 's'");
    }

    #[test]
    fn test_multiple_scenes_in_order() {
        let script = parse(
            "scene: one\n[set x to 1]\nscene: two\n[set x to 2]\nscene: three\n[set x to 3]\n",
        )
        .unwrap();
        let names: Vec<&str> = script.scenes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }
}
