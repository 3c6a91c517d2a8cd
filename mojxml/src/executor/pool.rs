//! Ordonnanceur borné commun aux exécuteurs
//!
//! Soumet des documents tant que le nombre de tâches en cours est inférieur
//! à la capacité, puis attend au moins une complétion, récupère toutes les
//! tâches terminées et les produit avant de reprendre la soumission.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};

use tracing::trace;

use super::Source;
use crate::error::{MojxmlError, Result};
use crate::types::Feature;

/// Résultat d'une tâche, renvoyé par le backend sur le canal de complétion
pub(crate) type TaskResult = Result<Vec<Feature>>;

/// Démarre une tâche de parsing.
///
/// L'implémentation doit envoyer exactement un résultat sur `done`, depuis
/// n'importe quel thread.
pub(crate) trait Backend {
    fn spawn(&self, content: Vec<u8>, done: Sender<TaskResult>);
}

/// Itérateur de résultats piloté par la capacité du pool
pub(crate) struct BoundedPool<'a, B: ?Sized> {
    backend: &'a B,
    source: Source<'a>,
    capacity: usize,
    in_flight: usize,
    exhausted: bool,
    ready: VecDeque<TaskResult>,
    sender: Sender<TaskResult>,
    receiver: Receiver<TaskResult>,
}

impl<'a, B: Backend + ?Sized> BoundedPool<'a, B> {
    pub(crate) fn new(backend: &'a B, source: Source<'a>, capacity: usize) -> Self {
        let (sender, receiver) = channel();
        Self {
            backend,
            source,
            capacity: capacity.max(1),
            in_flight: 0,
            exhausted: false,
            ready: VecDeque::new(),
            sender,
            receiver,
        }
    }

    /// Soumet des documents jusqu'à saturation ou épuisement de la source.
    ///
    /// Une erreur de lecture interrompt la soumission pour être produite
    /// immédiatement.
    fn submit(&mut self) {
        while !self.exhausted && self.in_flight < self.capacity {
            match self.source.next() {
                Some(Ok(content)) => {
                    self.backend.spawn(content, self.sender.clone());
                    self.in_flight += 1;
                    trace!(in_flight = self.in_flight, "Task submitted");
                }
                Some(Err(e)) => {
                    self.ready.push_back(Err(e));
                    return;
                }
                None => self.exhausted = true,
            }
        }
    }

    /// Bloque jusqu'à une complétion puis récupère toutes celles disponibles
    fn collect_completed(&mut self) {
        match self.receiver.recv() {
            Ok(result) => self.complete(result),
            // Impossible tant que `self.sender` est vivant
            Err(_) => {
                self.in_flight = 0;
                self.ready
                    .push_back(Err(MojxmlError::Worker("completion channel closed".into())));
                return;
            }
        }
        while let Ok(result) = self.receiver.try_recv() {
            self.complete(result);
        }
    }

    fn complete(&mut self, result: TaskResult) {
        self.in_flight -= 1;
        self.ready.push_back(result);
    }
}

impl<B: Backend + ?Sized> Iterator for BoundedPool<'_, B> {
    type Item = TaskResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(result) = self.ready.pop_front() {
                return Some(result);
            }

            self.submit();
            if !self.ready.is_empty() {
                continue;
            }
            if self.in_flight == 0 {
                return None;
            }
            self.collect_completed();
        }
    }
}
