use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use geoconflict_core::{GameState, Justification, PeaceTerm, WarStrategy};

pub fn run(game: &mut GameState) -> Result<()> {
    print_intro(game);
    let stdin = io::stdin();

    loop {
        let date = game.calendar_date();
        print!("{}-{:02}-{:02}> ", date.year, date.month, date.day);
        io::stdout()
            .flush()
            .context("プロンプトのフラッシュに失敗しました")?;

        let mut line = String::new();
        let bytes = stdin
            .lock()
            .read_line(&mut line)
            .context("入力の読み込みに失敗しました")?;

        if bytes == 0 {
            println!("入力が終了したためシミュレーションを終了します。");
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Err(error) = dispatch_command(game, trimmed) {
            println!("エラー: {error}");
        }
    }
}

fn dispatch_command(game: &mut GameState, input: &str) -> Result<()> {
    let mut parts = input.split_whitespace();
    let command = parts
        .next()
        .ok_or_else(|| anyhow!("コマンドが指定されていません。"))?
        .to_ascii_lowercase();

    match command.as_str() {
        "help" | "?" => {
            print_help();
            Ok(())
        }
        "overview" | "ov" => {
            print_overview(game);
            Ok(())
        }
        "conflicts" | "wars" => {
            print_conflicts(game);
            Ok(())
        }
        "history" => {
            print_history(game);
            Ok(())
        }
        "territories" | "terr" => {
            print_territories(game);
            Ok(())
        }
        "rebellions" | "reb" => {
            print_rebellions(game);
            Ok(())
        }
        "reparations" | "rep" => {
            print_reparations(game);
            Ok(())
        }
        "declare" => {
            let attacker = parts
                .next()
                .ok_or_else(|| anyhow!("攻撃国を指定してください。"))?;
            let defender = parts
                .next()
                .ok_or_else(|| anyhow!("相手国を指定してください。"))?;
            let justification = match parts.next() {
                Some(token) => Justification::parse(token)
                    .ok_or_else(|| anyhow!("未知の開戦事由です: {token}"))?,
                None => Justification::HistoricalClaims,
            };
            let event = game.declare_war(attacker, defender, justification)?;
            println!("{}", event.describe());
            Ok(())
        }
        "strategy" => {
            let conflict_id = parse_id(parts.next(), "紛争ID")?;
            let token = parts
                .next()
                .ok_or_else(|| anyhow!("戦略を指定してください。"))?;
            let strategy = WarStrategy::parse(token)
                .ok_or_else(|| anyhow!("未知の戦略です: {token}"))?;
            let event = game.change_strategy(conflict_id, strategy)?;
            println!("{}", event.describe());
            Ok(())
        }
        "peace" => {
            let conflict_id = parse_id(parts.next(), "紛争ID")?;
            let token = parts
                .next()
                .ok_or_else(|| anyhow!("講和条件を指定してください。"))?;
            let term = PeaceTerm::parse(token)
                .ok_or_else(|| anyhow!("未知の講和条件です: {token}"))?;
            for event in game.negotiate_peace(conflict_id, term)? {
                println!("{}", event.describe());
            }
            Ok(())
        }
        "nuke" => {
            let conflict_id = parse_id(parts.next(), "紛争ID")?;
            let capable = game
                .country(game.player_code())
                .map(|country| country.nuclear_capable)
                .unwrap_or(false);
            let event = game.launch_nuclear_strike(conflict_id, capable)?;
            println!("{}", event.describe());
            Ok(())
        }
        "invest" => {
            let territory_id = parse_id(parts.next(), "領土ID")?;
            let amount: f64 = parts
                .next()
                .ok_or_else(|| anyhow!("投資額を指定してください。"))?
                .parse()
                .map_err(|_| anyhow!("投資額が数値ではありません。"))?;
            let morale = game.invest_in_territory(territory_id, amount)?;
            println!("領土の士気が {:.2} になりました。", morale);
            Ok(())
        }
        "annex" => {
            let territory_id = parse_id(parts.next(), "領土ID")?;
            game.annex_territory(territory_id)?;
            println!("領土を併合しました。");
            Ok(())
        }
        "autonomy" => {
            let territory_id = parse_id(parts.next(), "領土ID")?;
            let event = game.grant_territory_autonomy(territory_id)?;
            println!("{}", event.describe());
            Ok(())
        }
        "suppress" => {
            let rebellion_id = parse_id(parts.next(), "反乱ID")?;
            let strength = game
                .country(game.player_code())
                .map(|country| country.military_strength)
                .unwrap_or(0);
            let event = game.suppress_rebellion(rebellion_id, strength)?;
            println!("{}", event.describe());
            Ok(())
        }
        "independence" => {
            let rebellion_id = parse_id(parts.next(), "反乱ID")?;
            let event = game.grant_independence(rebellion_id)?;
            println!("{}", event.describe());
            Ok(())
        }
        "concede" => {
            let rebellion_id = parse_id(parts.next(), "反乱ID")?;
            let event = game.grant_rebellion_autonomy(rebellion_id)?;
            println!("{}", event.describe());
            Ok(())
        }
        "advance" | "end" => {
            let days: u64 = match parts.next() {
                Some(token) => token
                    .parse()
                    .map_err(|_| anyhow!("日数が数値ではありません: {token}"))?,
                None => 1,
            };
            let events = game.advance_days(days)?;
            let date = game.calendar_date();
            println!(
                "--- {}-{:02}-{:02} までの出来事 ---",
                date.year, date.month, date.day
            );
            if events.is_empty() {
                println!("- 特筆すべき出来事はありませんでした。");
            } else {
                for event in events {
                    println!("- {}", event.describe());
                }
            }
            println!("--------------------------");
            Ok(())
        }
        "quit" | "exit" => {
            println!("シミュレーションを終了します。");
            std::process::exit(0);
        }
        other => {
            bail!("未知のコマンドです: {other}. help で一覧を確認してください。");
        }
    }
}

fn parse_id(token: Option<&str>, label: &str) -> Result<u32> {
    let token = token.ok_or_else(|| anyhow!("{label}を指定してください。"))?;
    token
        .parse()
        .map_err(|_| anyhow!("{label}が数値ではありません: {token}"))
}

fn print_intro(game: &GameState) {
    println!("ジオコンフリクト・シミュレーターへようこそ。");
    println!(
        "現在 {} ヶ国が参加し、あなたは {} を率いています。",
        game.countries().len(),
        game.country(game.player_code())
            .map(|country| country.name.as_str())
            .unwrap_or("不明")
    );
    println!("コマンド例: overview / declare AST BOR expansion / advance 30 / conflicts");
    println!("help で利用可能なコマンド一覧を表示します。");
}

fn print_help() {
    println!("利用可能なコマンド:");
    println!("  overview                  各国の台帳を一覧表示");
    println!("  conflicts                 進行中の紛争を表示");
    println!("  history                   終結した紛争を表示");
    println!("  territories               保有する占領地・併合地・自治領を表示");
    println!("  rebellions                活動中の反乱を表示");
    println!("  reparations               賠償金協定を表示");
    println!("  declare <攻撃国> <相手国> [事由]  宣戦布告");
    println!("                            事由: expansion | resource | hegemony | claims | regime | defense | border");
    println!("  strategy <紛争ID> <戦略>  戦略変更 (aggressive | balanced | attrition | defensive)");
    println!("  peace <紛争ID> <条件>     講和 (statusquo | reparations | partial | conquest)");
    println!("  nuke <紛争ID>             核攻撃で紛争を終結させる");
    println!("  invest <領土ID> <金額>    占領地へ統治投資");
    println!("  annex <領土ID>            士気の高い占領地を併合");
    println!("  autonomy <領土ID>         領土に自治権を付与");
    println!("  suppress <反乱ID>         反乱を軍事力で鎮圧");
    println!("  independence <反乱ID>     反乱地域の独立を承認");
    println!("  concede <反乱ID>          反乱地域へ自治権を付与");
    println!("  advance [日数]            時間を進める (省略時は1日)");
    println!("  quit                      終了");
}

fn print_overview(game: &GameState) {
    println!(
        "ID | {:<4} | {:<14} | {:>14} | {:>12} | {:>12} | {:>10}",
        "コード", "国名", "GDP(億ドル)", "人口(万人)", "総領土(km²)", "軍事力"
    );
    for (idx, country) in game.countries().iter().enumerate() {
        let marker = if country.code.eq_ignore_ascii_case(game.player_code()) {
            "*"
        } else {
            " "
        };
        println!(
            "{:>2}{} | {:<4} | {:<14} | {:>14.0} | {:>12.0} | {:>12.0} | {:>10}",
            idx + 1,
            marker,
            country.code,
            country.name,
            country.gdp / 100_000_000.0,
            country.population as f64 / 10_000.0,
            country.total_territory(),
            country.military_strength
        );
    }
}

fn print_conflicts(game: &GameState) {
    if game.conflicts().is_empty() {
        println!("進行中の紛争はありません。");
        return;
    }
    for conflict in game.conflicts() {
        println!(
            "#{} {} vs {} | {} | 開戦 {} 日目 | 戦略 {} | 損耗 {:.1}% / {:.1}%",
            conflict.id,
            conflict.attacker,
            conflict.defender,
            conflict.kind.label(),
            conflict.days_since_start,
            conflict.strategy.label(),
            conflict.attacker_attrition * 100.0,
            conflict.defender_attrition * 100.0
        );
        if let Some(transition) = &conflict.transition {
            println!(
                "    戦略移行中: {} へ (所要 {} 日)",
                transition.target.label(),
                transition.duration_days
            );
        }
    }
}

fn print_history(game: &GameState) {
    if game.conflict_history().is_empty() {
        println!("終結した紛争はまだありません。");
        return;
    }
    for conflict in game.conflict_history() {
        let outcome = conflict
            .outcome
            .map(|outcome| outcome.label())
            .unwrap_or("不明");
        let term = conflict
            .peace_term
            .map(|term| term.label())
            .unwrap_or("未処理");
        println!(
            "#{} {} vs {} | 結果: {} | 講和: {} | {} 日間",
            conflict.id, conflict.attacker, conflict.defender, outcome, term, conflict.days_since_start
        );
    }
}

fn print_territories(game: &GameState) {
    if game.territories().is_empty() {
        println!("保有している獲得領土はありません。");
        return;
    }
    for territory in game.territories() {
        println!(
            "#{} {} | 所有 {} (旧 {}) | {} | 士気 {:.2} | 反乱リスク {:.2} | {:.0} km²",
            territory.id,
            territory.name,
            territory.current_owner,
            territory.former_owner,
            territory.kind.label(),
            territory.morale,
            territory.rebellion_risk,
            territory.size
        );
    }
}

fn print_rebellions(game: &GameState) {
    if game.rebellions().is_empty() {
        println!("活動中の反乱はありません。");
        return;
    }
    for rebellion in game.rebellions() {
        println!(
            "#{} {} | 兵力 {} | 住民支持 {:.0}%",
            rebellion.id,
            rebellion.territory_name,
            rebellion.strength,
            rebellion.support * 100.0
        );
    }
}

fn print_reparations(game: &GameState) {
    let book = game.reparations();
    if book.active().is_empty() && book.completed().is_empty() {
        println!("賠償金協定はありません。");
        return;
    }
    for agreement in book.active() {
        println!(
            "{} → {} | 年額 {:.0} ドル | {}/{} 年",
            agreement.payer,
            agreement.recipient,
            agreement.yearly_payment,
            agreement.years_paid,
            agreement.total_years
        );
    }
    for agreement in book.completed() {
        println!(
            "{} → {} | 完済 (総額 {:.0} ドル)",
            agreement.payer, agreement.recipient, agreement.total_amount
        );
    }
}
