//! Statement dispatch.
//!
//! The first token of a line selects a generator out of a keyword table.
//! Each generator enforces its own argument range and hands validated,
//! already-resolved arguments to the emitter. Optional trailing arguments
//! are positional: supplying N of them always means the first N slots of
//! that statement's documented order.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};

use once_cell::sync::Lazy;

use crate::emit;
use crate::error::Error;
use crate::eval::{self, fmt_num};
use crate::interp::Interp;
use crate::lexer::{self, unquote};

/// One statement line after symbol resolution.
pub struct Stmt<'a> {
    pub line: usize,
    pub keyword: &'a str,
    pub args: &'a [String],
}

pub type Handler = fn(&mut Interp, &mut dyn Write, &Stmt) -> Result<(), Error>;

static GENERATORS: Lazy<HashMap<&'static str, Handler>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Handler> = HashMap::new();
    m.insert("deck", deck);
    m.insert("edeck", edeck);
    m.insert("canvas", canvas);
    m.insert("slide", slide);
    m.insert("eslide", eslide);
    for k in ["text", "ctext", "etext"] {
        m.insert(k, text);
    }
    m.insert("textblock", textblock);
    m.insert("textfile", textfile);
    m.insert("textcode", textcode);
    m.insert("image", image);
    m.insert("cimage", image);
    for k in ["list", "blist", "nlist", "clist"] {
        m.insert(k, list);
    }
    m.insert("li", listitem);
    m.insert("elist", elist);
    m.insert("rect", quad);
    m.insert("ellipse", quad);
    m.insert("square", square);
    m.insert("circle", square);
    m.insert("rrect", rrect);
    m.insert("polygon", polygon);
    m.insert("line", line);
    m.insert("hline", ruleline);
    m.insert("vline", ruleline);
    m.insert("curve", curve);
    m.insert("arc", arc);
    for k in ["larrow", "rarrow", "uarrow", "darrow"] {
        m.insert(k, arrow);
    }
    for k in ["lcarrow", "rcarrow", "ucarrow", "dcarrow"] {
        m.insert(k, carrow);
    }
    for k in ["lbrace", "rbrace", "ubrace", "dbrace"] {
        m.insert(k, brace);
    }
    m.insert("legend", legend);
    m.insert("grid", grid);
    m.insert("include", include);
    m.insert("chart", chart);
    m.insert("dchart", chart);
    m
});

pub fn generator(keyword: &str) -> Option<Handler> {
    GENERATORS.get(keyword).copied()
}

fn arity(s: &Stmt, min: usize, max: usize, usage: &str) -> Result<(), Error> {
    if s.args.len() < min || s.args.len() > max {
        return Err(Error::Usage {
            line: s.line,
            usage: format!("{} {usage}", s.keyword),
        });
    }
    Ok(())
}

fn num(s: &Stmt, i: usize) -> Result<f64, Error> {
    eval::number(&s.args[i], s.line)
}

fn optnum(s: &Stmt, i: usize, default: f64) -> Result<f64, Error> {
    match s.args.get(i) {
        Some(t) => eval::number(t, s.line),
        None => Ok(default),
    }
}

/// Arguments from position `n` on (empty when fewer were supplied).
fn tail<'a>(s: &'a Stmt, n: usize) -> &'a [String] {
    &s.args[s.args.len().min(n)..]
}

fn deck(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 0, 0, "")?;
    emit::open(w, "deck")?;
    Ok(())
}

fn edeck(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 0, 0, "")?;
    emit::close(w, "deck")?;
    Ok(())
}

fn canvas(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 2, 2, "width height")?;
    emit::canvas(w, &s.args[0], &s.args[1])?;
    Ok(())
}

fn slide(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 0, 2, "[bgcolor] [fgcolor]")?;
    emit::slide(w, s.args)?;
    Ok(())
}

fn eslide(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 0, 0, "")?;
    emit::close(w, "slide")?;
    Ok(())
}

fn text(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 4, 8, "\"text\" x y size [font] [color] [opacity] [link]")?;
    let align = match s.keyword {
        "ctext" => Some("c"),
        "etext" => Some("e"),
        _ => None,
    };
    emit::text(
        w,
        unquote(&s.args[0]),
        &s.args[1],
        &s.args[2],
        &s.args[3],
        align,
        tail(s, 4),
    )?;
    Ok(())
}

fn textblock(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 5, 9, "\"text\" x y width size [font] [color] [opacity] [link]")?;
    emit::textblock(
        w,
        unquote(&s.args[0]),
        &s.args[1],
        &s.args[2],
        &s.args[3],
        &s.args[4],
        tail(s, 5),
    )?;
    Ok(())
}

fn textfile(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 4, 8, "\"file\" x y size [font] [color] [opacity] [linespacing]")?;
    emit::textfile(
        w,
        unquote(&s.args[0]),
        &s.args[1],
        &s.args[2],
        &s.args[3],
        tail(s, 4),
    )?;
    Ok(())
}

fn textcode(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 5, 6, "\"file\" x y width size [color]")?;
    emit::textcode(
        w,
        unquote(&s.args[0]),
        &s.args[1],
        &s.args[2],
        &s.args[3],
        &s.args[4],
        s.args.get(5).map(|c| unquote(c)),
    )?;
    Ok(())
}

fn image(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    // cimage carries a caption between the name and the coordinates
    if s.keyword == "cimage" {
        arity(s, 6, 8, "\"file\" \"caption\" x y width height [scale] [link]")?;
        emit::image(
            w,
            unquote(&s.args[0]),
            Some(unquote(&s.args[1])),
            &s.args[2],
            &s.args[3],
            &s.args[4],
            &s.args[5],
            tail(s, 6),
        )?;
    } else {
        arity(s, 5, 7, "\"file\" x y width height [scale] [link]")?;
        emit::image(
            w,
            unquote(&s.args[0]),
            None,
            &s.args[1],
            &s.args[2],
            &s.args[3],
            &s.args[4],
            tail(s, 5),
        )?;
    }
    Ok(())
}

fn list(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 3, 7, "x y size [font] [color] [opacity] [linespacing]")?;
    let (ltype, align) = match s.keyword {
        "blist" => (Some("bullet"), None),
        "nlist" => (Some("number"), None),
        "clist" => (None, Some("c")),
        _ => (None, None),
    };
    emit::list_open(w, &s.args[0], &s.args[1], &s.args[2], ltype, align, tail(s, 3))?;
    Ok(())
}

fn listitem(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 1, 1, "\"text\"")?;
    emit::listitem(w, unquote(&s.args[0]))?;
    Ok(())
}

fn elist(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 0, 0, "")?;
    emit::close(w, "list")?;
    Ok(())
}

fn quad(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 4, 6, "x y w h [color] [opacity]")?;
    let tag = if s.keyword == "ellipse" { "ellipse" } else { "rect" };
    emit::quad(
        w,
        tag,
        &s.args[0],
        &s.args[1],
        &s.args[2],
        &s.args[3],
        None,
        tail(s, 4),
    )?;
    Ok(())
}

fn square(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 3, 5, "x y w [color] [opacity]")?;
    let tag = if s.keyword == "circle" { "ellipse" } else { "rect" };
    emit::quad(
        w,
        tag,
        &s.args[0],
        &s.args[1],
        &s.args[2],
        &s.args[2],
        None,
        tail(s, 3),
    )?;
    Ok(())
}

fn rrect(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 5, 7, "x y w h radius [color] [opacity]")?;
    emit::quad(
        w,
        "rect",
        &s.args[0],
        &s.args[1],
        &s.args[2],
        &s.args[3],
        Some(s.args[4].as_str()),
        tail(s, 5),
    )?;
    Ok(())
}

fn polygon(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 2, 4, "\"xcoords\" \"ycoords\" [color] [opacity]")?;
    emit::polygon(w, unquote(&s.args[0]), unquote(&s.args[1]), tail(s, 2))?;
    Ok(())
}

fn line(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 4, 7, "x1 y1 x2 y2 [size] [color] [opacity]")?;
    emit::line(w, &s.args[0], &s.args[1], &s.args[2], &s.args[3], tail(s, 4))?;
    Ok(())
}

/// `hline`/`vline`: the second endpoint is computed from the start plus
/// the length.
fn ruleline(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 3, 6, "x y length [size] [color] [opacity]")?;
    let x = num(s, 0)?;
    let y = num(s, 1)?;
    let len = num(s, 2)?;
    let (x2, y2) = if s.keyword == "hline" {
        (x + len, y)
    } else {
        (x, y + len)
    };
    emit::line(
        w,
        &s.args[0],
        &s.args[1],
        &fmt_num(x2),
        &fmt_num(y2),
        tail(s, 3),
    )?;
    Ok(())
}

fn curve(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 6, 9, "x1 y1 x2 y2 x3 y3 [size] [color] [opacity]")?;
    emit::curve(
        w,
        &s.args[0],
        &s.args[1],
        &s.args[2],
        &s.args[3],
        &s.args[4],
        &s.args[5],
        tail(s, 6),
    )?;
    Ok(())
}

fn arc(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 6, 9, "x y w h a1 a2 [size] [color] [opacity]")?;
    emit::arc(
        w,
        &s.args[0],
        &s.args[1],
        &s.args[2],
        &s.args[3],
        &s.args[4],
        &s.args[5],
        tail(s, 6),
    )?;
    Ok(())
}

/// Head polygon for an arrow pointing in `dir`, tip at (tx,ty).
/// Point order: tip, barb, notch, barb; the shaft meets the notch, which
/// sits at 0.75 of the head depth from the tip.
fn arrowhead(dir: char, tx: f64, ty: f64, aw: f64, ah: f64) -> ([f64; 4], [f64; 4]) {
    match dir {
        'r' => (
            [tx, tx - aw, tx - aw * 0.75, tx - aw],
            [ty, ty + ah / 2.0, ty, ty - ah / 2.0],
        ),
        'l' => (
            [tx, tx + aw, tx + aw * 0.75, tx + aw],
            [ty, ty + ah / 2.0, ty, ty - ah / 2.0],
        ),
        'u' => (
            [tx, tx + aw / 2.0, tx, tx - aw / 2.0],
            [ty, ty - ah, ty - ah * 0.75, ty - ah],
        ),
        _ => (
            [tx, tx + aw / 2.0, tx, tx - aw / 2.0],
            [ty, ty + ah, ty + ah * 0.75, ty + ah],
        ),
    }
}

fn joined(vals: &[f64; 4]) -> String {
    vals.iter()
        .map(|v| fmt_num(*v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn arrow(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(
        s,
        3,
        8,
        "x y length [linewidth] [arrowwidth] [arrowheight] [color] [opacity]",
    )?;
    let x = num(s, 0)?;
    let y = num(s, 1)?;
    let len = num(s, 2)?;
    let lw = optnum(s, 3, 0.2)?;
    let aw = optnum(s, 4, 3.0)?;
    let ah = optnum(s, 5, 3.0)?;
    let copts = tail(s, 6);

    let dir = s.keyword.chars().next().unwrap_or('r');
    let (tx, ty) = match dir {
        'r' => (x + len, y),
        'l' => (x - len, y),
        'u' => (x, y + len),
        _ => (x, y - len),
    };
    let (xs, ys) = arrowhead(dir, tx, ty, aw, ah);

    let mut lopts = vec![fmt_num(lw)];
    lopts.extend_from_slice(copts);
    emit::line(
        w,
        &s.args[0],
        &s.args[1],
        &fmt_num(xs[2]),
        &fmt_num(ys[2]),
        &lopts,
    )?;
    emit::polygon(w, &joined(&xs), &joined(&ys), copts)?;
    Ok(())
}

/// Curved arrows: a quadratic curve with the head anchored at the end
/// point.
fn carrow(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(
        s,
        6,
        11,
        "x1 y1 x2 y2 x3 y3 [linewidth] [arrowwidth] [arrowheight] [color] [opacity]",
    )?;
    for i in 0..6 {
        num(s, i)?;
    }
    let lw = optnum(s, 6, 0.2)?;
    let aw = optnum(s, 7, 3.0)?;
    let ah = optnum(s, 8, 3.0)?;
    let copts = tail(s, 9);

    let dir = s.keyword.chars().next().unwrap_or('r');
    let (xs, ys) = arrowhead(dir, num(s, 4)?, num(s, 5)?, aw, ah);

    let mut lopts = vec![fmt_num(lw)];
    lopts.extend_from_slice(copts);
    emit::curve(
        w,
        &s.args[0],
        &s.args[1],
        &s.args[2],
        &s.args[3],
        &s.args[4],
        &s.args[5],
        &lopts,
    )?;
    emit::polygon(w, &joined(&xs), &joined(&ys), copts)?;
    Ok(())
}

/// Curly braces: four quadratic hook curves joined by two straight runs.
/// (x,y) is the tip, `size` the full extent across it.
fn brace(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(
        s,
        5,
        8,
        "x y size width height [linewidth] [color] [opacity]",
    )?;
    let x = num(s, 0)?;
    let y = num(s, 1)?;
    let half = num(s, 2)? / 2.0;
    let aw = num(s, 3)?;
    let ah = num(s, 4)?;
    let lw = optnum(s, 5, 0.2)?;
    let mut lopts = vec![fmt_num(lw)];
    lopts.extend_from_slice(tail(s, 6));

    let dir = s.keyword.chars().next().unwrap_or('l');
    let cv = |w: &mut dyn Write, p: [f64; 6]| -> io::Result<()> {
        emit::curve(
            w,
            &fmt_num(p[0]),
            &fmt_num(p[1]),
            &fmt_num(p[2]),
            &fmt_num(p[3]),
            &fmt_num(p[4]),
            &fmt_num(p[5]),
            &lopts,
        )
    };
    let ln = |w: &mut dyn Write, p: [f64; 4]| -> io::Result<()> {
        emit::line(
            w,
            &fmt_num(p[0]),
            &fmt_num(p[1]),
            &fmt_num(p[2]),
            &fmt_num(p[3]),
            &lopts,
        )
    };

    match dir {
        'l' | 'r' => {
            let sx = if dir == 'l' { 1.0 } else { -1.0 };
            let bx = x + sx * aw;
            cv(w, [x, y, bx, y, bx, y + ah])?;
            cv(w, [x, y, bx, y, bx, y - ah])?;
            ln(w, [bx, y + ah, bx, y + half - ah])?;
            ln(w, [bx, y - ah, bx, y - half + ah])?;
            cv(w, [bx, y + half - ah, bx, y + half, bx + sx * aw, y + half])?;
            cv(w, [bx, y - half + ah, bx, y - half, bx + sx * aw, y - half])?;
        }
        _ => {
            let sy = if dir == 'u' { -1.0 } else { 1.0 };
            let by = y + sy * ah;
            cv(w, [x, y, x, by, x + aw, by])?;
            cv(w, [x, y, x, by, x - aw, by])?;
            ln(w, [x + aw, by, x + half - aw, by])?;
            ln(w, [x - aw, by, x - half + aw, by])?;
            cv(w, [x + half - aw, by, x + half, by, x + half, by + sy * ah])?;
            cv(w, [x - half + aw, by, x - half, by, x - half, by + sy * ah])?;
        }
    }
    Ok(())
}

/// A color swatch with a text label beside it.
fn legend(_: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 6, 6, "\"text\" x y size font color")?;
    let x = num(s, 1)?;
    let y = num(s, 2)?;
    let size = num(s, 3)?;
    let sw = size * 0.75;
    emit::quad(
        w,
        "ellipse",
        &fmt_num(x),
        &fmt_num(y),
        &fmt_num(sw),
        &fmt_num(sw),
        None,
        &[s.args[5].clone()],
    )?;
    emit::text(
        w,
        unquote(&s.args[0]),
        &fmt_num(x + size),
        &fmt_num(y - size / 2.0),
        &s.args[3],
        None,
        &[s.args[4].clone(), s.args[5].clone()],
    )?;
    Ok(())
}

/// Place each statement of a file at successive grid positions,
/// substituting the standalone tokens `x` and `y` with the cell position.
fn grid(i: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 6, 6, "\"file\" x y xskip yskip limit")?;
    let x0 = num(s, 1)?;
    let y0 = num(s, 2)?;
    let xskip = num(s, 3)?;
    let yskip = num(s, 4)?;
    let limit = num(s, 5)?;

    let path = unquote(&s.args[0]).to_string();
    let text = fs::read_to_string(&path).map_err(|e| Error::File {
        line: s.line,
        path,
        source: e,
    })?;

    let (mut cx, mut cy) = (x0, y0);
    for raw in text.lines() {
        let tokens = match lexer::tokenize(raw) {
            Ok(t) => t,
            Err(_) => {
                i.report(Error::UnterminatedQuote { line: s.line });
                continue;
            }
        };
        if tokens.is_empty() {
            continue;
        }
        let placed: Vec<String> = tokens
            .iter()
            .map(|t| match t.as_str() {
                "x" => fmt_num(cx),
                "y" => fmt_num(cy),
                _ => t.clone(),
            })
            .collect();
        i.statement(s.line, placed, w)?;
        cx += xskip;
        if cx > limit {
            cx = x0;
            cy -= yskip;
        }
    }
    Ok(())
}

/// Process another script in place, through the full pipeline.
fn include(i: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 1, 1, "\"file\"")?;
    let path = unquote(&s.args[0]).to_string();
    let text = fs::read_to_string(&path).map_err(|e| Error::File {
        line: s.line,
        path: path.clone(),
        source: e,
    })?;
    let lines: Vec<(usize, String)> = text
        .lines()
        .enumerate()
        .map(|(n, l)| (n + 1, l.to_string()))
        .collect();
    i.run_lines(&lines, w)?;
    Ok(())
}

/// The escape hatch: rebuild the command line from the evaluated,
/// unquoted arguments, run it, and copy its stdout into the output.
fn chart(i: &mut Interp, w: &mut dyn Write, s: &Stmt) -> Result<(), Error> {
    arity(s, 1, usize::MAX, "args ...")?;
    let mut cmd = String::from(s.keyword);
    for a in s.args {
        cmd.push(' ');
        cmd.push_str(unquote(a));
    }
    match i.runner.run(&cmd) {
        Ok(bytes) => {
            w.write_all(&bytes)?;
            Ok(())
        }
        Err(reason) => Err(Error::Command {
            line: s.line,
            cmd,
            reason,
        }),
    }
}
