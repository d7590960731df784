// Terminal front end for a chat session: the visitor types messages, picks
// quick actions by number and walks through the cost calculator.

use std::io::Write;

use anyhow::{Context, Result};
use berezka_chat::calculator::{BookingObject, CalcStep};
use berezka_chat::quick_actions::{QUICK_ACTIONS, TOPIC_SHORTCUTS};
use berezka_chat::{ChatController, Message, MessageId, SendOutcome};
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

type InputLines = Lines<BufReader<Stdin>>;

pub async fn run_chat(mut controller: ChatController) -> Result<()> {
    info!("Starting interactive chat session...");
    for message in controller.conversation().messages() {
        println!("🌲 {}\n", message.text);
    }
    print_actions();
    println!("Команды: /N — быстрое действие, /reset — очистить контекст, /quit — выход.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                controller.reset_history();
                println!("Контекст очищен.");
                continue;
            }
            "/actions" => {
                print_actions();
                continue;
            }
            _ => {}
        }

        let text = match resolve_shortcut(line) {
            Some(text) => {
                println!("> {}", text);
                text.to_string()
            }
            None => line.to_string(),
        };

        match send_and_print(&mut controller, &text).await {
            SendOutcome::CalculatorOpened => run_calculator(&mut controller, &mut lines).await?,
            SendOutcome::Ignored => debug!("Input ignored"),
            SendOutcome::Replied(_) => {}
        }
    }
    info!("Chat session finished.");
    Ok(())
}

/// Sends one message and prints the reply as it streams in, followed by its
/// time label.
pub async fn send_and_print(controller: &mut ChatController, text: &str) -> SendOutcome {
    controller.conversation_mut().set_input(text);
    let text = controller.conversation().input().to_string();
    let mut printed = 0;
    let outcome = controller
        .send_message(&text, |message: &Message| {
            print!("{}", &message.text[printed..]);
            printed = message.text.len();
            let _ = std::io::stdout().flush();
        })
        .await;
    if let SendOutcome::Replied(id) = outcome {
        print_time_label(controller, id);
    }
    outcome
}

fn print_time_label(controller: &ChatController, id: MessageId) {
    match controller.conversation().message(id) {
        Some(message) => println!("\n[{}]\n", message.time_label()),
        None => println!("\n"),
    }
}

/// `/N` picks the N-th quick action; `/t N` the N-th header topic.
fn resolve_shortcut(line: &str) -> Option<&'static str> {
    let rest = line.strip_prefix('/')?;
    if let Some(n) = rest.strip_prefix("t ") {
        let index: usize = n.trim().parse().ok()?;
        return TOPIC_SHORTCUTS.get(index.checked_sub(1)?).map(|(_, q)| *q);
    }
    let index: usize = rest.parse().ok()?;
    QUICK_ACTIONS.get(index.checked_sub(1)?).copied()
}

fn print_actions() {
    println!("Быстрые действия:");
    for (i, action) in QUICK_ACTIONS.iter().enumerate() {
        println!("  /{} {}", i + 1, action);
    }
    println!("Темы:");
    for (i, (label, _)) in TOPIC_SHORTCUTS.iter().enumerate() {
        println!("  /t {} {}", i + 1, label);
    }
    println!();
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    std::io::stdout().flush().context("Failed to flush stdout")
}

async fn read_answer(lines: &mut InputLines) -> Result<Option<String>> {
    Ok(lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
        .map(|l| l.trim().to_string()))
}

/// Walks the visitor through the three calculator steps. `/cancel`, end of
/// input, or an empty answer on the first step with no date yet closes the
/// form. An empty answer keeps the value already entered.
async fn run_calculator(controller: &mut ChatController, lines: &mut InputLines) -> Result<()> {
    println!("🧮 Рассчитать стоимость (/cancel — закрыть, < — назад)");
    loop {
        let form = controller.conversation().calculator();
        let step = form.step();
        match step {
            CalcStep::Date => match form.date() {
                Some(date) => prompt(&format!("📆 Шаг 1/3: дата (ГГГГ-ММ-ДД) [{}]: ", date))?,
                None => prompt("📆 Шаг 1/3: дата (ГГГГ-ММ-ДД): ")?,
            },
            CalcStep::Guests => prompt(&format!(
                "👥 Шаг 2/3: сколько человек? [{}] (+/-): ",
                form.guests()
            ))?,
            CalcStep::Object => {
                println!("🏡 Шаг 3/3: что выберем?");
                for (i, object) in BookingObject::ALL.iter().enumerate() {
                    println!("  {}. {}", i + 1, object);
                }
                prompt("Номер: ")?;
            }
        }

        let Some(answer) = read_answer(lines).await? else {
            controller.conversation_mut().calculator_mut().close();
            return Ok(());
        };
        let can_advance = controller.conversation().calculator().can_advance();
        if answer == "/cancel" || (step == CalcStep::Date && answer.is_empty() && !can_advance) {
            controller.conversation_mut().calculator_mut().close();
            println!("Расчёт отменён.");
            return Ok(());
        }

        let form = controller.conversation_mut().calculator_mut();
        if answer == "<" {
            form.back()?;
            continue;
        }

        match step {
            CalcStep::Date if answer.is_empty() => {
                form.next()?;
            }
            CalcStep::Date => match NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
                Ok(date) => {
                    form.set_date(date);
                    form.next()?;
                }
                Err(_) => println!("Не похоже на дату, пример: 2025-06-01"),
            },
            CalcStep::Guests => match answer.as_str() {
                "+" => form.increment_guests(),
                "-" => form.decrement_guests(),
                "" => {
                    form.next()?;
                }
                n => match n.parse::<u32>() {
                    Ok(guests) => {
                        form.set_guests(guests);
                        form.next()?;
                    }
                    Err(_) => println!("Введите число гостей"),
                },
            },
            CalcStep::Object => {
                let choice = answer
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| BookingObject::ALL.get(i).copied());
                match choice {
                    Some(object) => {
                        form.select_object(object);
                        let mut printed = 0;
                        let outcome = controller
                            .submit_calculation(|message: &Message| {
                                print!("{}", &message.text[printed..]);
                                printed = message.text.len();
                                let _ = std::io::stdout().flush();
                            })
                            .await?;
                        match outcome {
                            SendOutcome::Replied(id) => print_time_label(controller, id),
                            _ => println!("\n"),
                        }
                        return Ok(());
                    }
                    None => println!("Выберите номер от 1 до {}", BookingObject::ALL.len()),
                }
            }
        }
    }
}
