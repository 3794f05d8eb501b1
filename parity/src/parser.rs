use chumsky::error::Simple;
use chumsky::primitive::{choice, end, just, none_of};
use chumsky::text::TextParser;
use chumsky::{text, Parser};
use solver::Player;

use crate::{Node, ParityGame};

pub fn parse_parity_game(source: &str) -> Result<ParityGame, Vec<Simple<char>>> {
    let number = text::int(10)
        .try_map(|n: String, span| n.parse::<usize>().map_err(|e| Simple::custom(span, e)))
        .padded();
    let comma = just(',').padded();
    let semi = just(';').padded();

    let header = |keyword| just(keyword).padded().ignore_then(number).then_ignore(semi);
    let headers = header("parity").or_not().then(header("start").or_not());

    let player = choice((just('0').to(Player::P0), just('1').to(Player::P1)));
    let successors = number.separated_by(comma).at_least(1);
    let name = none_of("\"").repeated().collect::<String>().delimited_by(just('"'), just('"'));
    let comment = none_of(";").repeated();
    let row = number
        .then(number)
        .then(player)
        .then(successors)
        .then(name.padded().or_not())
        .then_ignore(comment);
    let row = row.map(|((((id, priority), player), successors), name)| Node {
        id,
        priority,
        player,
        successors,
        name,
    });

    let rows = row.then_ignore(semi).repeated();
    let game = headers
        .then(rows)
        .then_ignore(end())
        .map(|((max_id, start), nodes)| ParityGame { max_id, start, nodes });

    game.parse(source)
}
