use std::thread;
use std::time::Duration;

use locosync::header::{HeaderValue, ACCEPT};
use locosync::interceptor::{DefaultHeaders, LogInterceptor};
use locosync::{Client, VERSION};

const URL: &str = "https://pokeapi.co/api/v2/pokemon?limit=20&offset=0";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("LocoSync Pokémon list example");
    println!("Framework version: {VERSION}");
    println!("--------------------------------");

    let client = Client::create();
    client.add_interceptor(DefaultHeaders::new().with(ACCEPT, HeaderValue::from_static("application/json")));
    client.add_interceptor(LogInterceptor::default());

    let pending = client.get(URL);
    println!("Fetching the Pokémon list...");

    // Keep the main thread busy while the request runs in the background
    for i in 1..=3 {
        println!("Working... {i}s");
        thread::sleep(Duration::from_secs(1));
    }

    let res = pending.wait();
    if !res.ok() {
        anyhow::bail!("cannot fetch Pokémon (status {}): {}", res.status_code, res.error_message);
    }

    let data = res.json();
    println!("Total Pokémon available: {}", data["count"].as_u64().unwrap_or(0));
    println!("First 20 Pokémon:");
    for pokemon in data["results"].as_array().into_iter().flatten() {
        let name = pokemon["name"].as_str().unwrap_or("N/A");
        let url = pokemon["url"].as_str().unwrap_or("N/A");
        println!(" - {name} ({url})");
    }

    println!("--------------------------------");
    println!("Done in {:.2}s.", res.elapsed_time());
    Ok(())
}
