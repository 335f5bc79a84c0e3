/// Terminal renderer.
///
/// Draws one frame from an immutable `GameState` plus the host's HUD data.
/// The simulation works in logical pixels; one terminal cell covers
/// `CELL_W × CELL_H` of them.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use anti_aircraft::compute::cannon_origin;
use anti_aircraft::entities::{
    Explosion, ExplosionStage, GameState, Playfield, Point,
};
use anti_aircraft::explosions;
use anti_aircraft::ranking::Ranking;

// ── Geometry ──────────────────────────────────────────────────────────────────

pub const CELL_W: f32 = 10.0;
pub const CELL_H: f32 = 20.0;

/// Row 0 is the HUD, the last row the controls hint.
const PLAY_TOP: u16 = 1;
const RESERVED_ROWS: u16 = 2;

pub fn playfield_for(cols: u16, rows: u16) -> Playfield {
    Playfield {
        width: cols as f32 * CELL_W,
        height: rows.saturating_sub(RESERVED_ROWS).max(1) as f32 * CELL_H,
    }
}

/// Centre of a terminal cell in logical coordinates.
pub fn to_logical(col: u16, row: u16) -> Point {
    Point::new(
        (col as f32 + 0.5) * CELL_W,
        (row.saturating_sub(PLAY_TOP) as f32 + 0.5) * CELL_H,
    )
}

/// Cell for a logical point, as signed coordinates so callers can clip.
fn to_cell(p: Point) -> (i32, i32) {
    (
        (p.x / CELL_W).floor() as i32,
        (p.y / CELL_H).floor() as i32 + PLAY_TOP as i32,
    )
}

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_AMMO: Color = Color::Yellow;
const C_HUD_EMPTY: Color = Color::Red;
const C_HUD_SCORE: Color = Color::Green;
const C_PLANE: [Color; 4] = [Color::White, Color::Yellow, Color::DarkYellow, Color::Red];
const C_CANNON: Color = Color::Grey;
const C_BULLET: Color = Color::DarkYellow;
const C_CROSSHAIR: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

const PLANE_TOP: &str = "    ╱▔▔╲    ";
const PLANE_BODY: &str = "◄▬▬▬████▬▬▬▶";

/// What the host shows on top of the board once the round is over.
pub struct GameOverView<'a> {
    pub ranking: &'a Ranking,
    /// `Some` while the player is typing a name for the table.
    pub name_input: Option<&'a str>,
    /// Row the last submitted score landed on.
    pub placed: Option<usize>,
}

pub struct Hud<'a> {
    pub best: Option<u32>,
    pub effects_muted: bool,
    pub music_muted: bool,
    pub game_over: Option<GameOverView<'a>>,
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    now_ms: u64,
    hud: &Hud,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, state, hud, cols)?;
    draw_border(out, cols, rows)?;
    draw_cannon(out, state, cols, rows)?;

    if state.health.alive {
        draw_plane(out, state, cols, rows)?;
    }
    for ex in &state.explosions {
        draw_explosion(out, state, ex, now_ms, cols, rows)?;
    }
    for b in &state.bullets {
        put(out, to_cell(Point::new(b.x, b.y)), "•", C_BULLET, cols, rows)?;
    }
    draw_crosshair(out, state, cols, rows)?;
    draw_controls_hint(out, hud, rows)?;

    if let Some(view) = hud.game_over.as_ref().filter(|_| state.round.is_over()) {
        draw_game_over(out, state, view, cols, rows)?;
    }

    // Cursor parked on the hint row
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Print `text` starting at `cell`, dropping characters that fall outside
/// the play rows.
fn put<W: Write>(
    out: &mut W,
    cell: (i32, i32),
    text: &str,
    color: Color,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let (col, row) = cell;
    if row < PLAY_TOP as i32 || row >= rows.saturating_sub(1) as i32 {
        return Ok(());
    }
    out.queue(style::SetForegroundColor(color))?;
    for (i, ch) in text.chars().enumerate() {
        let c = col + i as i32;
        if c < 0 || c >= cols as i32 || ch == ' ' {
            continue;
        }
        out.queue(cursor::MoveTo(c as u16, row as u16))?;
        out.queue(Print(ch))?;
    }
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    // Ground line just above the hint row
    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(2)))?;
    out.queue(Print("▁".repeat(cols as usize)))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, hud: &Hud, cols: u16) -> std::io::Result<()> {
    let ammo = &state.ammo;
    let bar_len = 20usize;
    let filled = if ammo.initial == 0 {
        0
    } else {
        (ammo.remaining as usize * bar_len).div_ceil(ammo.initial as usize)
    };
    let bar = format!("{}{}", "▮".repeat(filled), "▯".repeat(bar_len - filled.min(bar_len)));

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(if ammo.is_empty() { C_HUD_EMPTY } else { C_HUD_AMMO }))?;
    out.queue(Print(format!("AMMO {} {:>3}/{}", bar, ammo.remaining, ammo.initial)))?;

    let right = match hud.best {
        Some(best) => format!("PLANES DOWN: {}  BEST: {}", state.score.planes_destroyed, best),
        None => format!("PLANES DOWN: {}", state.score.planes_destroyed),
    };
    let rx = cols.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(right))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_plane<W: Write>(out: &mut W, state: &GameState, cols: u16, rows: u16) -> std::io::Result<()> {
    let (col, row) = to_cell(Point::new(state.pose.x, state.pose.y));
    let half = PLANE_BODY.chars().count() as i32 / 2;
    let damage = (state.health.hits_taken as usize).min(C_PLANE.len() - 1);
    let color = C_PLANE[damage];

    // Climb or dive shows up as the fin tilting one cell
    let tilt = if state.pose.rotation > 0.05 {
        1
    } else if state.pose.rotation < -0.05 {
        -1
    } else {
        0
    };
    put(out, (col - half + tilt, row - 1), PLANE_TOP, color, cols, rows)?;
    put(out, (col - half, row), PLANE_BODY, color, cols, rows)
}

fn draw_cannon<W: Write>(out: &mut W, state: &GameState, cols: u16, rows: u16) -> std::io::Result<()> {
    //   ▲       ← muzzle
    //  /█\      ← mount
    let (col, row) = to_cell(cannon_origin(state));
    put(out, (col, row), "▲", C_CANNON, cols, rows)?;
    put(out, (col - 1, row + 1), "/█\\", C_CANNON, cols, rows)
}

fn draw_explosion<W: Write>(
    out: &mut W,
    state: &GameState,
    ex: &Explosion,
    now_ms: u64,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let cfg = &state.config.explosion;
    let centre = to_cell(explosions::rendered_position(ex, &state.pose));
    let alpha = explosions::alpha(ex, now_ms, cfg);
    let radius = (explosions::scale(ex, cfg) * 4.0).round() as i32;

    let (glyph, color) = match ex.stage {
        ExplosionStage::Impact => ("✶", Color::Yellow),
        ExplosionStage::DamageFlash => ("▒", Color::DarkYellow),
        _ if alpha > 0.66 => ("█", Color::Yellow),
        _ if alpha > 0.33 => ("▓", Color::Red),
        _ => ("░", Color::DarkRed),
    };

    if radius == 0 {
        return put(out, centre, glyph, color, cols, rows);
    }
    // Cells are twice as tall as wide, so stretch horizontally
    for dy in -radius..=radius {
        for dx in -2 * radius..=2 * radius {
            let nx = dx as f32 / 2.0;
            if nx * nx + (dy * dy) as f32 <= (radius * radius) as f32 {
                put(out, (centre.0 + dx, centre.1 + dy), glyph, color, cols, rows)?;
            }
        }
    }
    Ok(())
}

fn draw_crosshair<W: Write>(out: &mut W, state: &GameState, cols: u16, rows: u16) -> std::io::Result<()> {
    let (col, row) = to_cell(state.crosshair.position());
    put(out, (col - 1, row), "─┼─", C_CROSSHAIR, cols, rows)?;
    put(out, (col, row - 1), "│", C_CROSSHAIR, cols, rows)?;
    put(out, (col, row + 1), "│", C_CROSSHAIR, cols, rows)
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, hud: &Hud, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    let on_off = |muted: bool| if muted { "off" } else { "on" };
    out.queue(Print(format!(
        "MOUSE : Aim   CLICK / SPACE : Fire   M : Sound ({})   N : Music ({})   +/- : Volume   Q : Quit",
        on_off(hud.effects_muted),
        on_off(hud.music_muted)
    )))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &GameOverView,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let mut lines: Vec<(String, Color)> = vec![
        ("╔════════════════════╗".into(), Color::Red),
        ("║     OUT OF AMMO    ║".into(), Color::Red),
        ("╚════════════════════╝".into(), Color::Red),
        (
            format!("Planes destroyed: {:>3}", state.score.planes_destroyed),
            Color::Yellow,
        ),
        (String::new(), Color::White),
        ("──── TOP GUNNERS ────".into(), Color::Cyan),
    ];

    if view.ranking.entries().is_empty() {
        lines.push(("no scores yet".into(), Color::DarkGrey));
    }
    for (i, entry) in view.ranking.entries().iter().enumerate() {
        let color = if view.placed == Some(i) { Color::Yellow } else { Color::White };
        lines.push((
            format!("{}. {:<15} {:>3}  {}", i + 1, entry.player_name, entry.score, entry.date),
            color,
        ));
    }
    lines.push((String::new(), Color::White));

    match view.name_input {
        Some(name) => {
            lines.push(("★ NEW HIGH SCORE ★".into(), Color::Yellow));
            lines.push((format!("Name: {}_", name), Color::White));
            lines.push(("ENTER - Save   ESC - Skip".into(), Color::DarkGrey));
        }
        None => lines.push(("R - Play Again  Q - Quit".into(), Color::White)),
    }

    let cx = cols / 2;
    let start_row = (rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}
