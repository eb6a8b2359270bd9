use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::commands::{self, Session};
use crate::config::Config;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::shutdown::Shutdown;
use crate::storage::Databases;
use crate::Result;

/// Runs the server until `shutdown` completes. Binding the listener or
/// opening the databases fails fast; everything after that only tears down
/// the connection it happened on.
pub async fn run(config: Config, shutdown: impl Future) -> Result<()> {
    let databases = Arc::new(Databases::open(&config.leveldb_path, &config.leveldb)?);

    let listener = TcpListener::bind(&config.listen).await?;
    info!("server listening on {}", config.listen);

    let (notify_shutdown, _) = broadcast::channel::<()>(1);

    tokio::select! {
        res = serve(&listener, &databases, &config, &notify_shutdown) => {
            // The accept loop only returns on a listener error.
            if let Err(err) = res {
                error!(cause = %err, "failed to accept");
            }
        }
        _ = shutdown => {
            info!("server is closing");
        }
    }

    // Dropping the sender fires the shutdown signal in every connection task.
    drop(notify_shutdown);

    databases.close()?;
    info!("server is down");
    Ok(())
}

async fn serve(
    listener: &TcpListener,
    databases: &Arc<Databases>,
    config: &Config,
    notify_shutdown: &broadcast::Sender<()>,
) -> Result<()> {
    loop {
        let (socket, client_address) = listener.accept().await?;
        debug!("accepted connection from {}", client_address);

        let databases = databases.clone();
        let password = config.require_pass.clone();
        let shutdown = Shutdown::new(notify_shutdown.subscribe());

        tokio::spawn(async move {
            if let Err(err) = handle_connection(socket, databases, password, shutdown).await {
                error!(cause = %err, "connection error");
            }
            debug!("connection from {} closed", client_address);
        });
    }
}

/// Per-connection loop: read a frame, dispatch it, write the reply. Strictly
/// sequential within the connection; the next command is read only after the
/// previous reply went out.
async fn handle_connection(
    socket: TcpStream,
    databases: Arc<Databases>,
    password: String,
    mut shutdown: Shutdown,
) -> Result<()> {
    let mut connection = Connection::new(socket);
    let mut session = Session::new(databases, password);

    while !shutdown.is_shutdown() {
        let maybe_frame = tokio::select! {
            res = connection.read_frame() => res?,
            _ = shutdown.recv() => return Ok(()),
        };

        let frame = match maybe_frame {
            Some(frame) => frame,
            // Client closed the connection.
            None => return Ok(()),
        };

        let reply = dispatch_recovering(frame, &mut session);
        connection.write_frame(&reply).await?;
    }

    Ok(())
}

/// A handler must never tear down the server: backend failures and panics
/// are logged and turned into a generic error reply, and the connection
/// keeps going.
fn dispatch_recovering(frame: Frame, session: &mut Session) -> Frame {
    let result: std::thread::Result<Result<Frame>> =
        catch_unwind(AssertUnwindSafe(|| commands::dispatch(frame, session)));

    match result {
        Ok(Ok(reply)) => reply,
        Ok(Err(err)) => {
            error!(cause = %err, "command failed");
            Frame::Error(commands::ERR_SERVER_UNKNOWN.to_string())
        }
        Err(panic) => {
            error!("panic in command handler: {}", describe_panic(&panic));
            Frame::Error(commands::ERR_SERVER_UNKNOWN.to_string())
        }
    }
}

fn describe_panic(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
