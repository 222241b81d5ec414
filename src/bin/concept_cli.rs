use std::{
    error::Error,
    io,
    net::{SocketAddr, TcpStream},
};

use clap::{Parser, ValueEnum};
use log::info;

use concept_session::{
    CliError, Command, execute, prompt,
    proto::transaction::TxType,
    protocol::ProtocolTransport,
    session::{OpenOptions, Session, SessionError},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TxKind {
    Read,
    Write,
    Batch,
}

impl From<TxKind> for TxType {
    fn from(kind: TxKind) -> Self {
        match kind {
            TxKind::Read => TxType::Read,
            TxKind::Write => TxType::Write,
            TxKind::Batch => TxType::Batch,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server address
    address: SocketAddr,
    /// Keyspace to open the transaction on
    #[arg(long)]
    keyspace: String,
    #[arg(long, value_enum, default_value_t = TxKind::Read)]
    tx_type: TxKind,
    #[arg(long, requires = "password")]
    username: Option<String>,
    #[arg(long, requires = "username")]
    password: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize env_logger; For logging to STDOUT/STDERR
    env_logger::init();

    let cli = Cli::parse();
    let mut options = OpenOptions::new(cli.keyspace).tx_type(cli.tx_type.into());
    if let (Some(username), Some(password)) = (cli.username, cli.password) {
        options = options.credentials(username, password);
    }

    let stream = TcpStream::connect(cli.address)?;
    let session = Session::open(ProtocolTransport::new(stream), &options)?;
    info!("connected to {}", cli.address);

    let stdin = io::stdin();
    let stdout = io::stdout();
    loop {
        let cmd = match prompt(stdin.lock(), StdOut {
            inner: stdout.lock(),
        }) {
            Ok(cmd) => cmd,
            Err(CliError::Io(e)) => return Err(e.into()),
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };

        if cmd == Command::Exit {
            break;
        }

        match execute(&session, &cmd, stdout.lock()) {
            Ok(()) => {}
            // The server closes the transaction after a failure.
            Err(CliError::Session(SessionError::Transport(e))) => return Err(e.into()),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}

/// StdOut wrapper that flushes content after every write.
struct StdOut<W: io::Write> {
    inner: W,
}

impl<W: io::Write> io::Write for StdOut<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res = self.inner.write(buf);
        if res.is_ok() {
            self.inner.flush()?
        }
        res
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
